// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GitHub sign-in, OAuth callback and sign-out.

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{OAuthError, Principal};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorization code issued by GitHub
    pub code: Option<String>,
    /// Value echoed back from the authorize redirect
    pub state: Option<String>,
    /// Set when the user declined or GitHub refused the request
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CallbackError {
    #[error("callback arrived without a login cookie")]
    MissingSession,

    #[error("OAuth state missing, expired or mismatched")]
    StateMismatch,

    #[error("callback carried no authorization code")]
    MissingCode,

    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

/// Start the GitHub OAuth handshake.
#[utoipa::path(
    get,
    path = "/auth/github",
    tag = "Auth",
    responses((status = 303, description = "Redirect to GitHub authorize page"))
)]
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // The cookie is about to be replaced, so whatever it named is unreachable.
    if let Some(previous) = state.cookies.session_id(&headers) {
        state.sessions.remove(&previous);
    }

    let oauth_state = Uuid::new_v4().simple().to_string();
    let login_id = state.sessions.start_login(oauth_state.clone());

    let location = state.oauth.authorize_url(&oauth_state);
    (
        [(SET_COOKIE, state.cookies.set_cookie(&login_id))],
        Redirect::to(&location),
    )
        .into_response()
}

/// Complete the handshake: `/dash` on success, `/` on any failure.
#[utoipa::path(
    get,
    path = "/callback",
    tag = "Auth",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Redirect to /dash on success or / on failure")
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match complete_login(&state, &headers, query).await {
        Ok((session_id, username)) => {
            info!(%username, "user signed in");
            (
                [(SET_COOKIE, state.cookies.set_cookie(&session_id))],
                Redirect::to("/dash"),
            )
                .into_response()
        }
        Err(err) => {
            warn!(error = %err, "sign-in failed");
            Redirect::to("/").into_response()
        }
    }
}

async fn complete_login(
    state: &AppState,
    headers: &HeaderMap,
    query: CallbackQuery,
) -> Result<(String, String), CallbackError> {
    let login_id = state
        .cookies
        .session_id(headers)
        .ok_or(CallbackError::MissingSession)?;

    // Consume the state even when GitHub reports an error.
    let expected = state.sessions.take_oauth_state(&login_id);

    if let Some(error) = query.error {
        let detail = query.error_description.unwrap_or_default();
        return Err(OAuthError::Denied(format!("{error}: {detail}")).into());
    }

    match (expected, query.state) {
        (Some(expected), Some(got)) if expected == got => {}
        _ => return Err(CallbackError::StateMismatch),
    }

    let code = query.code.ok_or(CallbackError::MissingCode)?;
    let token = state.oauth.exchange_code(&code).await?;
    let username = state.oauth.fetch_login(&token).await?;

    // The session only exists once GitHub vouched for the user, under an id
    // the browser has not seen before.
    let session_id = state
        .sessions
        .sign_in(Principal::new(username.clone(), token));

    Ok((session_id, username))
}

/// Drop the session and return to the landing page.
#[utoipa::path(
    get,
    path = "/logout",
    tag = "Auth",
    responses((status = 303, description = "Redirect to /"))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = state.cookies.session_id(&headers) {
        state.sessions.remove(&session_id);
    }
    (
        [(SET_COOKIE, state.cookies.clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
