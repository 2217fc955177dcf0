// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::response::{IntoResponse, Redirect, Response};

/// Reason a request could not be tied to a signed-in user.
///
/// Every variant answers with a redirect to the landing page; the variant
/// only matters for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No session cookie present
    MissingSession,
    /// Cookie signature did not verify or the session is unknown/expired
    InvalidSession,
    /// Cookie names a login that has not completed
    NotAuthenticated,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "missing_session",
            AuthError::InvalidSession => "invalid_session",
            AuthError::NotAuthenticated => "not_authenticated",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "No session cookie"),
            AuthError::InvalidSession => write!(f, "Session is invalid or expired"),
            AuthError::NotAuthenticated => write!(f, "Session is not signed in"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error_code = self.error_code(), "redirecting unauthenticated request");
        Redirect::to("/").into_response()
    }
}
