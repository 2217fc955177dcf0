// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Landing page and dashboard.

use axum::response::Html;

use crate::auth::{Auth, MaybeAuth};
use crate::pages;

#[utoipa::path(
    get,
    path = "/",
    tag = "Pages",
    responses((status = 200, description = "Sign-in page", body = String, content_type = "text/html"))
)]
pub async fn index(MaybeAuth(principal): MaybeAuth) -> Html<String> {
    Html(pages::signin(
        principal.as_ref().map(|p| p.username.as_str()),
    ))
}

#[utoipa::path(
    get,
    path = "/dash",
    tag = "Pages",
    responses(
        (status = 200, description = "Upload form", body = String, content_type = "text/html"),
        (status = 303, description = "Not signed in; redirect to /")
    )
)]
pub async fn dashboard(Auth(principal): Auth) -> Html<String> {
    Html(pages::dashboard(&principal.username))
}
