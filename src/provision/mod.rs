// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Repository Provisioning
//!
//! Creates a repository for the signed-in user and seeds it:
//!
//! 1. **Existence check** - refuse if `owner/name` already exists
//! 2. **Create** - create the public repository
//! 3. **Tag** - set the topic set to [`TOPIC_TAG`]
//! 4. **Commit file** - commit the upload as [`SEED_FILE_NAME`]
//!
//! Stages run strictly in order and stop at the first failure. Nothing is
//! retried or rolled back: a failure after stage 2 leaves the repository in
//! whatever state the last successful stage produced, and the returned
//! [`ProvisionFailure`] names the stage that broke.
//!
//! The existence check is best effort. Another request can create the same
//! name before stage 2 runs; that surfaces as an ordinary create failure.

use std::fmt;

mod workflow;

pub use workflow::Provisioner;

/// Name of the committed seed file.
pub const SEED_FILE_NAME: &str = "index.json";
/// Topic every provisioned repository is tagged with.
pub const TOPIC_TAG: &str = "sumo-shapes-stage";
/// Commit message for the seed file.
pub const COMMIT_MESSAGE: &str = "initial commit";

/// Validated input for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    repo_name: String,
    description: String,
    file_content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("repository name is required")]
    EmptyName,

    #[error("repository name '{0}' is not allowed")]
    ReservedName(String),
}

impl ProvisionRequest {
    /// Build a request. The name is trimmed, must not be empty and must not
    /// be a `.` or `..` path segment.
    pub fn new(
        repo_name: impl Into<String>,
        description: impl Into<String>,
        file_content: Vec<u8>,
    ) -> Result<Self, InvalidRequest> {
        let repo_name = repo_name.into().trim().to_string();
        if repo_name.is_empty() {
            return Err(InvalidRequest::EmptyName);
        }
        if repo_name == "." || repo_name == ".." {
            return Err(InvalidRequest::ReservedName(repo_name));
        }
        Ok(Self {
            repo_name,
            description: description.into(),
            file_content,
        })
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn file_content(&self) -> &[u8] {
        &self.file_content
    }

    pub fn file_name(&self) -> &'static str {
        SEED_FILE_NAME
    }

    pub fn topic_tag(&self) -> &'static str {
        TOPIC_TAG
    }
}

/// Workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ExistenceCheck,
    Create,
    TagTopics,
    CommitFile,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExistenceCheck => "existence_check",
            Stage::Create => "create",
            Stage::TagTopics => "tag_topics",
            Stage::CommitFile => "commit_file",
        }
    }

    /// Whether the remote repository exists when this stage fails.
    pub fn leaves_partial_repository(&self) -> bool {
        matches!(self, Stage::TagTopics | Stage::CommitFile)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The existence check found the repository.
    AlreadyExists,
    /// The provider answered with an error status.
    Rejected { status: u16 },
    /// No usable answer (network failure or malformed response).
    Unavailable,
}

/// Stage-tagged failure of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionFailure {
    pub stage: Stage,
    pub reason: FailureReason,
    /// Provider's message when it sent one, otherwise a description of the fault.
    pub message: String,
}

impl fmt::Display for ProvisionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Success { repo_url: String },
    Failure(ProvisionFailure),
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProvisionOutcome::Success { .. })
    }
}
