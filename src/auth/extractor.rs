// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the signed-in user.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.username, principal.access_token
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Principal};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Rejects with [`AuthError`], which redirects to `/`. Place it before any
/// body extractor so unauthenticated requests are turned away before the
/// body is read.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A principal already resolved for this request wins.
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        let session_id = state
            .cookies
            .session_id(&parts.headers)
            .ok_or(AuthError::MissingSession)?;

        let principal = match state.sessions.principal(&session_id) {
            Some(principal) => principal,
            None if state.sessions.is_pending(&session_id) => {
                return Err(AuthError::NotAuthenticated)
            }
            None => return Err(AuthError::InvalidSession),
        };

        parts.extensions.insert(principal.clone());
        Ok(Auth(principal))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting.
pub struct MaybeAuth(pub Option<Principal>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(principal)) => Ok(MaybeAuth(Some(principal))),
            Err(_) => Ok(MaybeAuth(None)),
        }
    }
}
