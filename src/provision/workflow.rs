// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeSet;
use std::sync::Arc;

use base64ct::{Base64, Encoding};
use tracing::{info, warn};

use super::{
    FailureReason, ProvisionFailure, ProvisionOutcome, ProvisionRequest, Stage, COMMIT_MESSAGE,
};
use crate::auth::Principal;
use crate::providers::{ProviderError, PutFileRequest, RepositoryApi};

impl ProvisionFailure {
    fn provider(stage: Stage, err: ProviderError) -> Self {
        let reason = match err.status() {
            Some(status) => FailureReason::Rejected { status },
            None => FailureReason::Unavailable,
        };
        Self {
            stage,
            reason,
            message: err.to_string(),
        }
    }

    fn already_exists(repo_name: &str) -> Self {
        Self {
            stage: Stage::ExistenceCheck,
            reason: FailureReason::AlreadyExists,
            message: format!("Repository '{repo_name}' already exists."),
        }
    }
}

/// Runs the provisioning workflow against a [`RepositoryApi`].
///
/// Holds no per-run state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct Provisioner {
    api: Arc<dyn RepositoryApi>,
    web_base_url: String,
}

impl Provisioner {
    /// `web_base_url` is the provider's browser host, e.g. `https://github.com`.
    pub fn new(api: Arc<dyn RepositoryApi>, web_base_url: impl Into<String>) -> Self {
        Self {
            api,
            web_base_url: web_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Browser URL of `owner/name`.
    pub fn repository_url(&self, owner: &str, name: &str) -> String {
        format!("{}/{owner}/{name}", self.web_base_url)
    }

    /// Run all four stages for `principal`.
    pub async fn provision(
        &self,
        principal: &Principal,
        request: &ProvisionRequest,
    ) -> ProvisionOutcome {
        match self.run(principal, request).await {
            Ok(repo_url) => {
                info!(
                    owner = %principal.username,
                    repo = %request.repo_name(),
                    %repo_url,
                    "repository provisioned"
                );
                ProvisionOutcome::Success { repo_url }
            }
            Err(failure) => {
                warn!(
                    owner = %principal.username,
                    repo = %request.repo_name(),
                    stage = %failure.stage,
                    reason = ?failure.reason,
                    partial = failure.stage.leaves_partial_repository(),
                    error = %failure.message,
                    "repository provisioning failed"
                );
                ProvisionOutcome::Failure(failure)
            }
        }
    }

    async fn run(
        &self,
        principal: &Principal,
        request: &ProvisionRequest,
    ) -> Result<String, ProvisionFailure> {
        let token = &principal.access_token;
        let owner = principal.username.as_str();
        let name = request.repo_name();

        let existing = self
            .api
            .get_repository(owner, name, token)
            .await
            .map_err(|e| ProvisionFailure::provider(Stage::ExistenceCheck, e))?;
        if existing.is_some() {
            return Err(ProvisionFailure::already_exists(name));
        }
        info!(%owner, repo = %name, "repository name is free");

        let repo = self
            .api
            .create_repository(name, request.description(), token)
            .await
            .map_err(|e| ProvisionFailure::provider(Stage::Create, e))?;
        info!(owner = %repo.owner, repo = %repo.name, "repository created");

        let topics = BTreeSet::from([request.topic_tag().to_string()]);
        self.api
            .set_topics(&repo.owner, &repo.name, &topics, token)
            .await
            .map_err(|e| ProvisionFailure::provider(Stage::TagTopics, e))?;
        info!(
            owner = %repo.owner,
            repo = %repo.name,
            topic = request.topic_tag(),
            "topics updated"
        );

        let content = Base64::encode_string(request.file_content());
        self.api
            .put_file(
                PutFileRequest {
                    owner: &repo.owner,
                    repo: &repo.name,
                    path: request.file_name(),
                    message: COMMIT_MESSAGE,
                    content_base64: &content,
                },
                token,
            )
            .await
            .map_err(|e| ProvisionFailure::provider(Stage::CommitFile, e))?;
        info!(
            owner = %repo.owner,
            repo = %repo.name,
            path = request.file_name(),
            bytes = request.file_content().len(),
            "seed file committed"
        );

        Ok(self.repository_url(&repo.owner, &repo.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::providers::fake::{Call, FakeRepositoryApi};
    use crate::providers::RepoInfo;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn principal() -> Principal {
        Principal::new("octocat", AccessToken::new("gho_token"))
    }

    fn demo_request() -> ProvisionRequest {
        ProvisionRequest::new("demo", "d", b"{}".to_vec()).unwrap()
    }

    fn provisioner(api: &Arc<FakeRepositoryApi>) -> Provisioner {
        Provisioner::new(api.clone(), "https://github.com")
    }

    fn rejected(status: u16, message: &str) -> ProviderError {
        ProviderError::Rejected {
            status,
            message: message.to_string(),
        }
    }

    fn is_create(call: &Call) -> bool {
        matches!(call, Call::CreateRepository { .. })
    }

    fn is_topics(call: &Call) -> bool {
        matches!(call, Call::SetTopics { .. })
    }

    fn is_put(call: &Call) -> bool {
        matches!(call, Call::PutFile { .. })
    }

    #[tokio::test]
    async fn happy_path_runs_all_stages_in_order() {
        let api = Arc::new(FakeRepositoryApi::succeeding("octocat", "demo"));

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        assert_eq!(
            outcome,
            ProvisionOutcome::Success {
                repo_url: "https://github.com/octocat/demo".to_string()
            }
        );
        assert_eq!(
            api.calls(),
            vec![
                Call::GetRepository {
                    owner: "octocat".into(),
                    name: "demo".into()
                },
                Call::CreateRepository {
                    name: "demo".into(),
                    description: "d".into()
                },
                Call::SetTopics {
                    owner: "octocat".into(),
                    name: "demo".into(),
                    topics: vec!["sumo-shapes-stage".into()]
                },
                Call::PutFile {
                    owner: "octocat".into(),
                    repo: "demo".into(),
                    path: "index.json".into(),
                    message: "initial commit".into(),
                    content_base64: "e30=".into()
                },
            ]
        );
        assert!(api.tokens().iter().all(|t| t == "gho_token"));
    }

    #[tokio::test]
    async fn existing_repository_short_circuits() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo").with_lookup(Ok(Some(RepoInfo {
                owner: "octocat".into(),
                name: "demo".into(),
            }))),
        );

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        let ProvisionOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.stage, Stage::ExistenceCheck);
        assert_eq!(failure.reason, FailureReason::AlreadyExists);
        assert!(failure.message.contains("already exists"));
        assert_eq!(api.count(is_create), 0);
        assert_eq!(api.count(is_topics), 0);
        assert_eq!(api.count(is_put), 0);
    }

    #[tokio::test]
    async fn lookup_error_is_distinct_from_already_exists() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo")
                .with_lookup(Err(rejected(401, "Bad credentials"))),
        );

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        assert_eq!(
            outcome,
            ProvisionOutcome::Failure(ProvisionFailure {
                stage: Stage::ExistenceCheck,
                reason: FailureReason::Rejected { status: 401 },
                message: "Bad credentials".into(),
            })
        );
        assert_eq!(api.count(is_create), 0);
    }

    #[tokio::test]
    async fn create_failure_stops_before_later_stages() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo").with_create(Err(rejected(
                422,
                "Repository creation failed. (name already exists on this account)",
            ))),
        );

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        let ProvisionOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.stage, Stage::Create);
        assert_eq!(failure.reason, FailureReason::Rejected { status: 422 });
        assert_eq!(api.count(is_topics), 0);
        assert_eq!(api.count(is_put), 0);
    }

    #[tokio::test]
    async fn tag_failure_is_reported_without_rollback() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo")
                .with_topics(Err(rejected(403, "Resource not accessible"))),
        );

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        let ProvisionOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.stage, Stage::TagTopics);
        assert_eq!(failure.message, "Resource not accessible");
        assert_eq!(api.count(is_put), 0);
        // Lookup, create, tag: nothing else (in particular no delete) is issued.
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn commit_failure_is_reported_after_tagging() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo")
                .with_put(Err(ProviderError::Transport("connection reset".into()))),
        );

        let outcome = provisioner(&api).provision(&principal(), &demo_request()).await;

        let ProvisionOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.stage, Stage::CommitFile);
        assert_eq!(failure.reason, FailureReason::Unavailable);
        assert_eq!(failure.message, "request failed: connection reset");
        assert_eq!(api.count(is_topics), 1);
        assert_eq!(api.calls().len(), 4);
    }

    #[tokio::test]
    async fn repeated_failure_is_identical() {
        let api = Arc::new(
            FakeRepositoryApi::succeeding("octocat", "demo").with_lookup(Ok(Some(RepoInfo {
                owner: "octocat".into(),
                name: "demo".into(),
            }))),
        );
        let provisioner = provisioner(&api);

        let first = provisioner.provision(&principal(), &demo_request()).await;
        let second = provisioner.provision(&principal(), &demo_request()).await;

        assert!(!first.is_success());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn committed_content_is_base64_of_upload() {
        let upload: Vec<u8> = (0u8..=255)
            .chain(b"{\"shape\":\"circle\"}\n".iter().copied())
            .collect();
        let request = ProvisionRequest::new("demo", "", upload.clone()).unwrap();
        let api = Arc::new(FakeRepositoryApi::succeeding("octocat", "demo"));

        provisioner(&api).provision(&principal(), &request).await;

        let content = api
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::PutFile { content_base64, .. } => Some(content_base64),
                _ => None,
            })
            .expect("put_file was called");
        assert_eq!(STANDARD.decode(content).unwrap(), upload);
    }

    #[tokio::test]
    async fn later_stages_use_canonical_identity_from_create() {
        let api = Arc::new(FakeRepositoryApi::succeeding("octocat", "my-repo"));
        let request = ProvisionRequest::new("my repo", "", Vec::new()).unwrap();

        let outcome = provisioner(&api).provision(&principal(), &request).await;

        assert_eq!(
            outcome,
            ProvisionOutcome::Success {
                repo_url: "https://github.com/octocat/my-repo".into()
            }
        );
        assert!(api.calls().iter().any(|call| matches!(
            call,
            Call::PutFile { repo, .. } if repo == "my-repo"
        )));
    }

    #[test]
    fn repository_url_ignores_trailing_slash() {
        let api = Arc::new(FakeRepositoryApi::succeeding("o", "n"));
        let provisioner = Provisioner::new(api, "https://github.example.com/");
        assert_eq!(
            provisioner.repository_url("o", "n"),
            "https://github.example.com/o/n"
        );
    }
}
