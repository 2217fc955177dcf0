// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GitHub REST API client for repository provisioning.

use std::{collections::BTreeSet, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{ProviderError, PutFileRequest, RepoInfo, RepositoryApi};
use crate::auth::AccessToken;
use crate::error::ConfigError;

pub const API_ACCEPT: &str = "application/vnd.github.v3+json";
/// Topics were served under a preview media type; GitHub still honours it.
pub const TOPICS_ACCEPT: &str = "application/vnd.github.mercy-preview+json";
pub const USER_AGENT: &str = concat!("repo-seeder/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared reqwest client for GitHub API and OAuth calls.
pub fn build_http_client() -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

impl From<RepoResponse> for RepoInfo {
    fn from(repo: RepoResponse) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_base_url: String,
    http: Client,
}

impl GitHubClient {
    pub fn new(api_base_url: impl Into<String>, http: Client) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Absolute URL for `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.api_base_url)
            .map_err(|e| ProviderError::Transport(format!("invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Transport("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        accept: &str,
        body: Option<&Value>,
        token: &AccessToken,
    ) -> Result<Response, ProviderError> {
        let label = format!("{method} {}", url.path());
        let mut request = self
            .http
            .request(method, url)
            .header("Authorization", format!("token {}", token.expose_secret()))
            .header("Accept", accept);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{label} failed: {e}")))?;

        debug!(request = %label, status = %response.status(), "GitHub API call");
        Ok(response)
    }
}

/// Turn a non-success response into [`ProviderError::Rejected`].
async fn rejection(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Rejected {
        status: status.as_u16(),
        message: rejection_message(status, &body),
    }
}

/// Provider-facing message for a failed call.
///
/// Uses GitHub's `message` field, with the first `errors[].message` appended
/// when present, then the raw body, then the status reason.
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            let detail = value
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty());
            return match detail {
                Some(detail) => format!("{message} ({detail})"),
                None => message.to_string(),
            };
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
        token: &AccessToken,
    ) -> Result<Option<RepoInfo>, ProviderError> {
        let url = self.endpoint(&["repos", owner, name])?;
        let response = self.send(Method::GET, url, API_ACCEPT, None, token).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("repository lookup: {e}")))?;
        Ok(Some(repo.into()))
    }

    async fn create_repository(
        &self,
        name: &str,
        description: &str,
        token: &AccessToken,
    ) -> Result<RepoInfo, ProviderError> {
        let url = self.endpoint(&["user", "repos"])?;
        let body = json!({
            "name": name,
            "description": description,
            "private": false,
        });
        let response = self
            .send(Method::POST, url, API_ACCEPT, Some(&body), token)
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("repository creation: {e}")))?;
        Ok(repo.into())
    }

    async fn set_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &BTreeSet<String>,
        token: &AccessToken,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&["repos", owner, name, "topics"])?;
        let body = json!({ "names": topics.iter().collect::<Vec<_>>() });
        let response = self
            .send(Method::PUT, url, TOPICS_ACCEPT, Some(&body), token)
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }

    async fn put_file(
        &self,
        request: PutFileRequest<'_>,
        token: &AccessToken,
    ) -> Result<(), ProviderError> {
        let mut segments = vec!["repos", request.owner, request.repo, "contents"];
        segments.extend(request.path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments)?;
        let body = json!({
            "message": request.message,
            "content": request.content_base64,
        });
        let response = self
            .send(Method::PUT, url, API_ACCEPT, Some(&body), token)
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
