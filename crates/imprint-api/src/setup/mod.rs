//! Application setup and initialization
//!
//! All startup logic lives here rather than in main.rs: database pool and
//! migrations, the artifact store, the analyzer and its rasterizer, the
//! retention sweeper, and the router.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::state::AppState;
use imprint_core::Config;
use imprint_db::OrderRepository;
use imprint_processing::{DocumentAnalyzer, PdfiumRasterizer};
use imprint_services::{OrderNotifier, RetentionSweeper};
use imprint_storage::ArtifactStore;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    tracing::info!("Configuration loaded successfully");

    let pool = database::setup_database(&config).await?;

    let artifacts = Arc::new(
        ArtifactStore::new(config.storage_root.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize artifact store: {}", e))?,
    );
    tracing::info!(root = %config.storage_root.display(), "Artifact store ready");

    let rasterizer = Arc::new(PdfiumRasterizer::new(config.raster_max_pixels));
    let analyzer = DocumentAnalyzer::new(rasterizer, artifacts.clone());

    let orders = OrderRepository::new(pool.clone());

    let notifier = OrderNotifier::from_config(&config);
    if notifier.is_none() {
        tracing::info!("Order notifier disabled (gateway not configured)");
    }

    // The sweeper's first tick fires immediately, covering the boot-time
    // reclamation pass; subsequent ticks run on the configured interval.
    let sweeper = Arc::new(RetentionSweeper::new(
        artifacts.clone(),
        Duration::from_secs(config.staged_ttl_days * 24 * 3600),
        Duration::from_secs(config.sweep_interval_secs.max(1)),
    ));
    let _sweeper_handle = sweeper.start();

    let state = Arc::new(AppState {
        config: config.clone(),
        orders,
        artifacts,
        analyzer,
        notifier,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
