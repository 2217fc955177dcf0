// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `POST /create-repo`: parse the upload form and run provisioning.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    response::{Html, IntoResponse, Response},
};
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    error::ApiError,
    pages,
    provision::{ProvisionOutcome, ProvisionRequest},
    state::AppState,
};

/// Prefix of the plain-text body returned when provisioning fails.
pub const FAILURE_PREFIX: &str = "Error creating repository: ";

/// Multipart form accepted by `/create-repo`.
#[derive(ToSchema)]
pub struct CreateRepoForm {
    /// Name of the repository to create
    pub repo_name: String,
    /// Repository description
    pub repo_description: Option<String>,
    /// File committed as `index.json`
    #[schema(value_type = String, format = Binary)]
    pub repo_file: Vec<u8>,
}

#[derive(Debug, Default)]
struct UploadForm {
    repo_name: Option<String>,
    repo_description: Option<String>,
    repo_file: Option<Vec<u8>>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), err.body_text())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "repo_name" => form.repo_name = Some(field.text().await.map_err(multipart_error)?),
            "repo_description" => {
                form.repo_description = Some(field.text().await.map_err(multipart_error)?)
            }
            "repo_file" => {
                // Browsers send an empty, unnamed part when no file was chosen.
                let unnamed = field.file_name().is_none_or(str::is_empty);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !(unnamed && bytes.is_empty()) {
                    form.repo_file = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

impl UploadForm {
    fn into_request(self) -> Result<ProvisionRequest, ApiError> {
        let file = self
            .repo_file
            .ok_or_else(|| ApiError::bad_request("A file upload (repo_file) is required"))?;
        ProvisionRequest::new(
            self.repo_name.unwrap_or_default(),
            self.repo_description.unwrap_or_default(),
            file,
        )
        .map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

/// Create and seed a repository for the signed-in user.
#[utoipa::path(
    post,
    path = "/create-repo",
    tag = "Repositories",
    request_body(content = CreateRepoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Repository created", body = String, content_type = "text/html"),
        (status = 303, description = "Not signed in; redirect to /"),
        (status = 400, description = "Missing name or file", body = String),
        (status = 500, description = "A provisioning stage failed", body = String)
    )
)]
pub async fn create_repo(
    State(state): State<AppState>,
    Auth(principal): Auth,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request = read_form(multipart).await?.into_request()?;

    match state.provisioner.provision(&principal, &request).await {
        ProvisionOutcome::Success { repo_url } => {
            Ok(Html(pages::success(request.repo_name(), &repo_url)).into_response())
        }
        ProvisionOutcome::Failure(failure) => Err(ApiError::internal(format!(
            "{FAILURE_PREFIX}{}",
            failure.message
        ))),
    }
}
