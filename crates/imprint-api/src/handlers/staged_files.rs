//! Administrative management of staged (unconfirmed) uploads.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use imprint_core::models::StagedFileEntry;
use imprint_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[utoipa::path(
    get,
    path = "/api/admin/staged",
    tag = "admin",
    responses(
        (status = 200, description = "Staged uploads, newest first", body = [StagedFileEntry]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn list_staged_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StagedFileEntry>>, HttpAppError> {
    let entries = state.artifacts.list_staged().await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteStagedRequest {
    /// Paths relative to the temp storage root, as returned by the listing.
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteStagedResponse {
    pub deleted: usize,
    /// Per-path failures, including paths rejected by the traversal guard.
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/staged/delete",
    tag = "admin",
    request_body = DeleteStagedRequest,
    responses(
        (status = 200, description = "Deletion attempted; partial failures reported", body = DeleteStagedResponse),
        (status = 400, description = "Empty path list", body = ErrorResponse)
    )
)]
pub async fn delete_staged_files(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteStagedRequest>,
) -> Result<Json<DeleteStagedResponse>, HttpAppError> {
    if body.paths.is_empty() {
        return Err(AppError::InvalidInput("paths must not be empty".to_string()).into());
    }

    let (deleted, errors) = state.artifacts.delete_staged(&body.paths).await;
    Ok(Json(DeleteStagedResponse { deleted, errors }))
}
