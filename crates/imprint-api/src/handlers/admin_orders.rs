//! Administrative order management: listing, status updates, bulk deletion,
//! and document download.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use imprint_core::models::{OrderAdminResponse, OrderStatus};
use imprint_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub pickup_location: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "admin",
    params(
        ("pickup_location" = Option<String>, Query, description = "Filter by pickup location; omit or 'all' for every order")
    ),
    responses(
        (status = 200, description = "Orders, newest first", body = [OrderAdminResponse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderAdminResponse>>, HttpAppError> {
    let filter = query
        .pickup_location
        .as_deref()
        .map(str::trim)
        .filter(|loc| !loc.is_empty() && !loc.eq_ignore_ascii_case("all"));

    let orders = state.orders.list(filter).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub changes: u64,
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{order_id}/status",
    tag = "admin",
    params(("order_id" = String, Path, description = "Order identifier")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 404, description = "Unknown order", body = ErrorResponse)
    )
)]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, HttpAppError> {
    if body.status.trim().is_empty() {
        return Err(AppError::InvalidInput("Status must not be empty".to_string()).into());
    }

    let status = OrderStatus::from(body.status);
    let changes = state.orders.update_status(&order_id, &status).await?;
    if changes == 0 {
        return Err(AppError::NotFound(format!("Order {} not found", order_id)).into());
    }

    tracing::info!(order_id = %order_id, status = %status, "Order status updated");
    Ok(Json(UpdateStatusResponse {
        message: "Status updated successfully".to_string(),
        changes,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub order_ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    /// Database records removed. The database is authoritative.
    pub deleted: u64,
    /// Files that could not be removed from disk; reported, never fatal.
    pub file_failures: usize,
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders",
    tag = "admin",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Orders deleted; partial file failures reported", body = BulkDeleteResponse),
        (status = 400, description = "Empty id list", body = ErrorResponse)
    )
)]
pub async fn bulk_delete_orders(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, HttpAppError> {
    if body.order_ids.is_empty() {
        return Err(AppError::InvalidInput("order_ids must not be empty".to_string()).into());
    }

    // Files first, best-effort; then the records. A file that refuses to die
    // must not keep its order in the database.
    let files = state.orders.file_paths(&body.order_ids).await?;
    let mut file_failures = 0;
    for order_files in &files {
        file_failures += state
            .artifacts
            .delete_order_files(&order_files.file_path, &order_files.proof_path)
            .await;
    }

    let deleted = state.orders.delete_many(&body.order_ids).await?;

    Ok(Json(BulkDeleteResponse {
        deleted,
        file_failures,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{order_id}/document",
    tag = "admin",
    params(("order_id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The order's document as an attachment"),
        (status = 404, description = "Unknown order or missing file", body = ErrorResponse)
    )
)]
pub async fn download_order_document(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Response, HttpAppError> {
    let order = state
        .orders
        .get(&order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

    let path = state.artifacts.resolve_key(&order.file_path)?;
    let data = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("Document for order {} is missing", order_id))
        } else {
            AppError::from(e)
        }
    })?;

    let disposition = format!("attachment; filename=\"{}\"", order.original_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}
