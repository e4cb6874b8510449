//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use imprint_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Imprint API",
        version = "0.1.0",
        description = "Print-shop order intake API: per-page color/grayscale document analysis, staged uploads, order confirmation with payment proof, and an administrative surface for order and staging management."
    ),
    paths(
        handlers::analyze::analyze_document,
        handlers::confirm::confirm_order,
        handlers::admin_orders::list_orders,
        handlers::admin_orders::update_order_status,
        handlers::admin_orders::bulk_delete_orders,
        handlers::admin_orders::download_order_document,
        handlers::staged_files::list_staged_files,
        handlers::staged_files::delete_staged_files,
    ),
    components(schemas(
        handlers::analyze::AnalyzeResponse,
        handlers::admin_orders::UpdateStatusRequest,
        handlers::admin_orders::UpdateStatusResponse,
        handlers::admin_orders::BulkDeleteRequest,
        handlers::admin_orders::BulkDeleteResponse,
        handlers::staged_files::DeleteStagedRequest,
        handlers::staged_files::DeleteStagedResponse,
        models::OrderResponse,
        models::OrderAdminResponse,
        models::StagedFileEntry,
        error::ErrorResponse,
    )),
    tags(
        (name = "documents", description = "Document analysis"),
        (name = "orders", description = "Order confirmation"),
        (name = "admin", description = "Administrative surface (HTTP Basic auth)")
    )
)]
pub struct ApiDoc;
