//! Route configuration and setup

use crate::auth::{admin_auth_middleware, AdminAuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use imprint_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let auth_state = Arc::new(AdminAuthState {
        admin_user: config.admin_user.clone(),
        admin_pass: config.admin_pass.clone(),
    });

    let public_routes = public_routes(state.clone());
    let admin_routes = admin_routes(state).layer(axum::middleware::from_fn_with_state(
        auth_state,
        admin_auth_middleware,
    ));

    // Leave headroom above the document limit for the multipart envelope and
    // the remaining form fields.
    let body_limit = config.max_upload_size_bytes + 1024 * 1024;

    let app = public_routes
        .merge(admin_routes)
        .merge(
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs"),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors);

    Ok(app)
}

/// Public routes (no authentication required)
fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/documents/analyze",
            post(handlers::analyze::analyze_document),
        )
        .route("/api/orders", post(handlers::confirm::confirm_order))
        .with_state(state)
        .route("/health", get(health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
}

/// Administrative routes; the caller layers Basic auth on top.
fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/admin/orders",
            get(handlers::admin_orders::list_orders)
                .delete(handlers::admin_orders::bulk_delete_orders),
        )
        .route(
            "/api/admin/orders/{order_id}/status",
            put(handlers::admin_orders::update_order_status),
        )
        .route(
            "/api/admin/orders/{order_id}/document",
            get(handlers::admin_orders::download_order_document),
        )
        .route(
            "/api/admin/staged",
            get(handlers::staged_files::list_staged_files),
        )
        .route(
            "/api/admin/staged/delete",
            post(handlers::staged_files::delete_staged_files),
        )
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    };
    Ok(cors)
}
