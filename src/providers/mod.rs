// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hosting-provider API seam.
//!
//! [`RepositoryApi`] is the four-call surface the provisioning workflow needs.
//! [`github::GitHubClient`] implements it over the GitHub REST API; tests
//! substitute a recording fake.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::auth::AccessToken;

pub mod github;

#[cfg(test)]
pub(crate) mod fake;

/// Canonical identity of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub owner: String,
    pub name: String,
}

/// Arguments for committing a single file.
#[derive(Debug, Clone, Copy)]
pub struct PutFileRequest<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    /// Path inside the repository, `/`-separated.
    pub path: &'a str,
    pub message: &'a str,
    /// Standard base64 of the file bytes.
    pub content_base64: &'a str,
}

/// Failure of a single provider call.
///
/// Transport-specific error types stop here; callers only see this enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered successfully but the body was unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Look up `owner/name`. A "not found" answer is `Ok(None)`.
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
        token: &AccessToken,
    ) -> Result<Option<RepoInfo>, ProviderError>;

    /// Create a public repository owned by the token's user.
    async fn create_repository(
        &self,
        name: &str,
        description: &str,
        token: &AccessToken,
    ) -> Result<RepoInfo, ProviderError>;

    /// Replace the repository's topic set.
    async fn set_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &BTreeSet<String>,
        token: &AccessToken,
    ) -> Result<(), ProviderError>;

    /// Create a file in a single commit.
    async fn put_file(
        &self,
        request: PutFileRequest<'_>,
        token: &AccessToken,
    ) -> Result<(), ProviderError>;
}
