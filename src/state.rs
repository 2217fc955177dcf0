// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::warn;

use crate::auth::{GitHubOAuth, SessionCookies, SessionStore};
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::providers::github::{build_http_client, GitHubClient};
use crate::provision::Provisioner;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub cookies: SessionCookies,
    pub oauth: GitHubOAuth,
    pub provisioner: Provisioner,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        sessions: SessionStore,
        cookies: SessionCookies,
        oauth: GitHubOAuth,
        provisioner: Provisioner,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            cookies,
            oauth,
            provisioner,
            max_upload_bytes,
        }
    }

    /// Wire the GitHub clients, session store and cookie key from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let http = build_http_client()?;

        let cookies = match &config.session.secret {
            Some(secret) => SessionCookies::new(secret.clone(), config.session.secure_cookie),
            None => {
                warn!("SESSION_SECRET not set; using a random key, sessions end on restart");
                SessionCookies::ephemeral(config.session.secure_cookie)
            }
        };

        let api = GitHubClient::new(config.github.api_base_url.clone(), http.clone());

        Ok(Self::new(
            SessionStore::new(config.session.capacity, config.session.ttl),
            cookies,
            GitHubOAuth::new(&config.github, http),
            Provisioner::new(Arc::new(api), config.github.web_base_url.clone()),
            config.max_upload_bytes,
        ))
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by a succeeding fake provider and unreachable OAuth host.
    pub(crate) fn for_tests() -> Self {
        let api = Arc::new(crate::providers::fake::FakeRepositoryApi::succeeding(
            "octocat", "demo",
        ));
        Self::with_provider(api)
    }

    pub(crate) fn with_provider(api: Arc<dyn crate::providers::RepositoryApi>) -> Self {
        Self::with_provider_and_oauth_base(api, "http://127.0.0.1:9")
    }

    pub(crate) fn with_provider_and_oauth_base(
        api: Arc<dyn crate::providers::RepositoryApi>,
        base_url: &str,
    ) -> Self {
        let github = crate::config::GitHubConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            callback_url: "http://localhost:3000/callback".to_string(),
            scope: "public_repo".to_string(),
            api_base_url: base_url.to_string(),
            oauth_base_url: base_url.to_string(),
            web_base_url: "https://github.com".to_string(),
        };
        Self::new(
            SessionStore::new(100, std::time::Duration::from_secs(60)),
            SessionCookies::new(b"test-session-secret".to_vec(), false),
            GitHubOAuth::new(&github, reqwest::Client::new()),
            Provisioner::new(api, github.web_base_url.clone()),
            64 * 1024,
        )
    }
}
