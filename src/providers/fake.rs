// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted, call-recording [`RepositoryApi`] for tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ProviderError, PutFileRequest, RepoInfo, RepositoryApi};
use crate::auth::AccessToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetRepository {
        owner: String,
        name: String,
    },
    CreateRepository {
        name: String,
        description: String,
    },
    SetTopics {
        owner: String,
        name: String,
        topics: Vec<String>,
    },
    PutFile {
        owner: String,
        repo: String,
        path: String,
        message: String,
        content_base64: String,
    },
}

pub struct FakeRepositoryApi {
    lookup: Result<Option<RepoInfo>, ProviderError>,
    create: Result<RepoInfo, ProviderError>,
    topics: Result<(), ProviderError>,
    put: Result<(), ProviderError>,
    calls: Mutex<Vec<Call>>,
    tokens: Mutex<Vec<String>>,
}

impl FakeRepositoryApi {
    /// Every call succeeds; the repository does not exist beforehand.
    pub fn succeeding(owner: &str, name: &str) -> Self {
        Self {
            lookup: Ok(None),
            create: Ok(RepoInfo {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            topics: Ok(()),
            put: Ok(()),
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn with_lookup(mut self, result: Result<Option<RepoInfo>, ProviderError>) -> Self {
        self.lookup = result;
        self
    }

    pub fn with_create(mut self, result: Result<RepoInfo, ProviderError>) -> Self {
        self.create = result;
        self
    }

    pub fn with_topics(mut self, result: Result<(), ProviderError>) -> Self {
        self.topics = result;
        self
    }

    pub fn with_put(mut self, result: Result<(), ProviderError>) -> Self {
        self.put = result;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Raw tokens seen, in call order.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call, token: &AccessToken) {
        self.calls.lock().unwrap().push(call);
        self.tokens
            .lock()
            .unwrap()
            .push(token.expose_secret().to_string());
    }
}

#[async_trait]
impl RepositoryApi for FakeRepositoryApi {
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
        token: &AccessToken,
    ) -> Result<Option<RepoInfo>, ProviderError> {
        self.record(
            Call::GetRepository {
                owner: owner.to_string(),
                name: name.to_string(),
            },
            token,
        );
        self.lookup.clone()
    }

    async fn create_repository(
        &self,
        name: &str,
        description: &str,
        token: &AccessToken,
    ) -> Result<RepoInfo, ProviderError> {
        self.record(
            Call::CreateRepository {
                name: name.to_string(),
                description: description.to_string(),
            },
            token,
        );
        self.create.clone()
    }

    async fn set_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &BTreeSet<String>,
        token: &AccessToken,
    ) -> Result<(), ProviderError> {
        self.record(
            Call::SetTopics {
                owner: owner.to_string(),
                name: name.to_string(),
                topics: topics.iter().cloned().collect(),
            },
            token,
        );
        self.topics.clone()
    }

    async fn put_file(
        &self,
        request: PutFileRequest<'_>,
        token: &AccessToken,
    ) -> Result<(), ProviderError> {
        self.record(
            Call::PutFile {
                owner: request.owner.to_string(),
                repo: request.repo.to_string(),
                path: request.path.to_string(),
                message: request.message.to_string(),
                content_base64: request.content_base64.to_string(),
            },
            token,
        );
        self.put.clone()
    }
}
