//! Document analysis endpoint.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use imprint_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub color_page_count: usize,
    pub grayscale_page_count: usize,
    pub color_page_range: String,
    pub grayscale_page_range: String,
    /// Handle to the staged document, to be passed back on confirmation.
    pub staging_handle: String,
    pub original_name: String,
}

/// Extract the uploaded document from the multipart form. Exactly one field
/// named "document" is expected.
async fn extract_document(mut multipart: Multipart) -> Result<(Vec<u8>, String), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "document" {
            if file_data.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple document fields are not allowed; send exactly one field named 'document'".to_string(),
                ));
            }
            filename = field.file_name().map(|s: &str| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            file_data = Some(data.to_vec());
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::InvalidInput("No document uploaded".to_string()))?;
    let original_filename = filename.unwrap_or_else(|| "document.pdf".to_string());

    Ok((file_data, original_filename))
}

#[utoipa::path(
    post,
    path = "/api/documents/analyze",
    tag = "documents",
    responses(
        (status = 200, description = "Document analyzed and staged", body = AnalyzeResponse),
        (status = 400, description = "Missing or invalid document", body = ErrorResponse),
        (status = 413, description = "Document too large", body = ErrorResponse),
        (status = 500, description = "Document could not be rasterized", body = ErrorResponse)
    )
)]
pub async fn analyze_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, HttpAppError> {
    let (data, original_filename) = extract_document(multipart).await?;

    if data.len() > state.config.max_upload_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Document exceeds maximum allowed size of {} MB",
            state.config.max_upload_size_bytes / 1024 / 1024
        ))
        .into());
    }

    let analysis = state.analyzer.analyze(&data, &original_filename).await?;
    let classification = analysis.classification;

    Ok(Json(AnalyzeResponse {
        color_page_count: classification.color_pages.len(),
        grayscale_page_count: classification.grayscale_pages.len(),
        color_page_range: classification.color_page_range,
        grayscale_page_range: classification.grayscale_page_range,
        staging_handle: analysis.staging_handle,
        original_name: analysis.original_name,
    }))
}
