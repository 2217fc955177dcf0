// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The signed-in user and their delegated GitHub credential.

use std::fmt;

/// OAuth access token for the GitHub API.
///
/// `Debug` and `Display` never print the value. Use
/// [`AccessToken::expose_secret`] only where the token goes on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Authenticated user held in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// GitHub login; also the owner of repositories created for this user.
    pub username: String,
    pub access_token: AccessToken,
}

impl Principal {
    pub fn new(username: impl Into<String>, access_token: AccessToken) -> Self {
        Self {
            username: username.into(),
            access_token,
        }
    }
}
