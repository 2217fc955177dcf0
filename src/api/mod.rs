// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod login;
pub mod pages;
pub mod repos;

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    let routes = Router::new()
        .route("/", get(pages::index))
        .route("/dash", get(pages::dashboard))
        .route("/auth/github", get(login::login))
        .route("/callback", get(login::callback))
        .route("/logout", get(login::logout))
        .route(
            "/create-repo",
            post(repos::create_repo).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        pages::index,
        pages::dashboard,
        login::login,
        login::callback,
        login::logout,
        repos::create_repo,
        health::liveness
    ),
    components(schemas(repos::CreateRepoForm, health::HealthResponse)),
    tags(
        (name = "Pages", description = "Server-rendered pages"),
        (name = "Auth", description = "GitHub sign-in and sign-out"),
        (name = "Repositories", description = "Repository provisioning"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
