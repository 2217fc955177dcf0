// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GitHub OAuth web flow.
//!
//! 1. `/auth/github` redirects the browser to [`GitHubOAuth::authorize_url`]
//! 2. GitHub redirects back to `/callback?code=..&state=..`
//! 3. [`GitHubOAuth::exchange_code`] trades the code for an access token
//! 4. [`GitHubOAuth::fetch_login`] resolves the token to the user's login

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::AccessToken;
use crate::config::GitHubConfig;
use crate::providers::github::{API_ACCEPT, USER_AGENT};

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("authorization was denied: {0}")]
    Denied(String),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("failed to load user profile: {0}")]
    Profile(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Clone)]
pub struct GitHubOAuth {
    client_id: String,
    client_secret: String,
    callback_url: String,
    scope: String,
    oauth_base_url: String,
    api_base_url: String,
    http: Client,
}

impl GitHubOAuth {
    pub fn new(config: &GitHubConfig, http: Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            scope: config.scope.clone(),
            oauth_base_url: config.oauth_base_url.clone(),
            api_base_url: config.api_base_url.clone(),
            http,
        }
    }

    /// URL the browser is sent to in order to approve the application.
    pub fn authorize_url(&self, state: &str) -> String {
        let base = format!("{}/login/oauth/authorize", self.oauth_base_url);
        match Url::parse_with_params(
            &base,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        ) {
            Ok(url) => url.into(),
            Err(_) => base,
        }
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.callback_url.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/login/oauth/access_token", self.oauth_base_url))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .form(&form[..])
            .send()
            .await
            .map_err(|e| OAuthError::Exchange(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(OAuthError::Exchange(format!(
                "token request returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Exchange(format!("invalid token response: {e}")))?;

        // GitHub reports exchange errors with a 200 status.
        if let Some(error) = body.error {
            let detail = body.error_description.unwrap_or_default();
            return Err(OAuthError::Exchange(format!("{error}: {detail}")));
        }

        match body.access_token {
            Some(token) if !token.trim().is_empty() => Ok(AccessToken::new(token)),
            _ => Err(OAuthError::Exchange(
                "token response did not include access_token".to_string(),
            )),
        }
    }

    /// Login name of the user owning `token`.
    pub async fn fetch_login(&self, token: &AccessToken) -> Result<String, OAuthError> {
        let response = self
            .http
            .get(format!("{}/user", self.api_base_url))
            .header("Authorization", format!("token {}", token.expose_secret()))
            .header("Accept", API_ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(format!("GET /user failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(OAuthError::Profile(format!("GET /user returned {status}")));
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Profile(format!("GET /user invalid JSON: {e}")))?;

        Ok(user.login)
    }
}
