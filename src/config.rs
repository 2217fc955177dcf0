// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup. Blank values
//! are treated as unset.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GITHUB_CLIENT_ID` | OAuth application client id | Required |
//! | `GITHUB_CLIENT_SECRET` | OAuth application client secret | Required |
//! | `GITHUB_CALLBACK_URL` | OAuth redirect URI | `http://localhost:<PORT>/callback` |
//! | `GITHUB_OAUTH_SCOPE` | Scope requested at authorize time | `public_repo` |
//! | `GITHUB_API_BASE_URL` | GitHub REST API base | `https://api.github.com` |
//! | `GITHUB_OAUTH_BASE_URL` | GitHub OAuth host | `https://github.com` |
//! | `GITHUB_WEB_BASE_URL` | Host used for repository links | `https://github.com` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `SESSION_SECRET` | HMAC key for session cookies | Random per process |
//! | `SESSION_TTL_SECS` | Session lifetime in seconds | `86400` |
//! | `SESSION_CAPACITY` | Maximum live sessions | `10000` |
//! | `MAX_UPLOAD_BYTES` | Body limit for `/create-repo` | `1048576` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate and key | Unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;
use crate::logging::LogFormat;

pub const GITHUB_CLIENT_ID_ENV: &str = "GITHUB_CLIENT_ID";
pub const GITHUB_CLIENT_SECRET_ENV: &str = "GITHUB_CLIENT_SECRET";
pub const GITHUB_CALLBACK_URL_ENV: &str = "GITHUB_CALLBACK_URL";
pub const GITHUB_OAUTH_SCOPE_ENV: &str = "GITHUB_OAUTH_SCOPE";
pub const GITHUB_API_BASE_URL_ENV: &str = "GITHUB_API_BASE_URL";
pub const GITHUB_OAUTH_BASE_URL_ENV: &str = "GITHUB_OAUTH_BASE_URL";
pub const GITHUB_WEB_BASE_URL_ENV: &str = "GITHUB_WEB_BASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_SECS_ENV: &str = "SESSION_TTL_SECS";
pub const SESSION_CAPACITY_ENV: &str = "SESSION_CAPACITY";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";
pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com";
pub const DEFAULT_OAUTH_SCOPE: &str = "public_repo";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_SESSION_CAPACITY: usize = 10_000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// GitHub endpoints and OAuth application credentials.
#[derive(Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub scope: String,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub web_base_url: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .field("scope", &self.scope)
            .field("api_base_url", &self.api_base_url)
            .field("oauth_base_url", &self.oauth_base_url)
            .field("web_base_url", &self.web_base_url)
            .finish()
    }
}

/// Session store settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// `None` means a random key is generated at startup.
    pub secret: Option<Vec<u8>>,
    pub ttl: Duration,
    pub capacity: usize,
    /// Mark the cookie `Secure` (set when serving over TLS).
    pub secure_cookie: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub github: GitHubConfig,
    pub session: SessionConfig,
    pub max_upload_bytes: usize,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str| get(name).ok_or_else(|| ConfigError::Missing(name.to_string()));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV.to_string(),
                value: host.clone(),
            })?;

        let github = GitHubConfig {
            client_id: required(GITHUB_CLIENT_ID_ENV)?,
            client_secret: required(GITHUB_CLIENT_SECRET_ENV)?,
            callback_url: get(GITHUB_CALLBACK_URL_ENV)
                .unwrap_or_else(|| format!("http://localhost:{port}/callback")),
            scope: get(GITHUB_OAUTH_SCOPE_ENV).unwrap_or_else(|| DEFAULT_OAUTH_SCOPE.to_string()),
            api_base_url: base_url(get(GITHUB_API_BASE_URL_ENV), DEFAULT_API_BASE_URL),
            oauth_base_url: base_url(get(GITHUB_OAUTH_BASE_URL_ENV), DEFAULT_OAUTH_BASE_URL),
            web_base_url: base_url(get(GITHUB_WEB_BASE_URL_ENV), DEFAULT_WEB_BASE_URL),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV.to_string())),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV.to_string())),
        };

        let ttl_secs: u64 = parse_or(
            get(SESSION_TTL_SECS_ENV),
            SESSION_TTL_SECS_ENV,
            DEFAULT_SESSION_TTL.as_secs(),
        )?;

        let session = SessionConfig {
            secret: get(SESSION_SECRET_ENV).map(String::into_bytes),
            ttl: Duration::from_secs(ttl_secs),
            capacity: parse_or(
                get(SESSION_CAPACITY_ENV),
                SESSION_CAPACITY_ENV,
                DEFAULT_SESSION_CAPACITY,
            )?,
            secure_cookie: tls.is_some(),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: LOG_FORMAT_ENV.to_string(),
                value: raw,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            github,
            session,
            max_upload_bytes: parse_or(
                get(MAX_UPLOAD_BYTES_ENV),
                MAX_UPLOAD_BYTES_ENV,
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            tls,
            log_format,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn base_url(raw: Option<String>, default: &str) -> String {
    raw.unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const CREDENTIALS: [(&str, &str); 2] = [
        (GITHUB_CLIENT_ID_ENV, "client-id"),
        (GITHUB_CLIENT_SECRET_ENV, "client-secret"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = AppConfig::from_lookup(lookup(&CREDENTIALS)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.github.callback_url, "http://localhost:3000/callback");
        assert_eq!(config.github.scope, "public_repo");
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(config.github.web_base_url, "https://github.com");
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
        assert!(config.tls.is_none());
        assert!(!config.session.secure_cookie);
        assert!(config.session.secret.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn missing_client_id_is_reported_by_name() {
        let err = AppConfig::from_lookup(lookup(&[(GITHUB_CLIENT_SECRET_ENV, "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name == GITHUB_CLIENT_ID_ENV));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push((PORT_ENV, "   "));
        vars.push((SESSION_SECRET_ENV, ""));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.session.secret.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push((PORT_ENV, "not-a-port"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == PORT_ENV));
    }

    #[test]
    fn base_urls_drop_trailing_slash() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push((GITHUB_API_BASE_URL_ENV, "http://127.0.0.1:9999/"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.github.api_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn tls_requires_both_paths() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push((TLS_CERT_PATH_ENV, "/certs/cert.pem"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name == TLS_KEY_PATH_ENV));

        vars.push((TLS_KEY_PATH_ENV, "/certs/key.pem"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.tls.is_some());
        assert!(config.session.secure_cookie);
    }

    #[test]
    fn session_secret_is_redacted_in_debug_output() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push((SESSION_SECRET_ENV, "super-secret-value"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        let rendered = format!("{:?}", config.session);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
