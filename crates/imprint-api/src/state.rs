//! Application state.
//!
//! Every collaborator is constructed once at startup and injected here;
//! handlers extract what they need from the shared `Arc<AppState>`. There is
//! no ambient global state.

use std::sync::Arc;

use imprint_core::Config;
use imprint_db::OrderRepository;
use imprint_processing::DocumentAnalyzer;
use imprint_services::OrderNotifier;
use imprint_storage::ArtifactStore;

pub struct AppState {
    pub config: Config,
    pub orders: OrderRepository,
    pub artifacts: Arc<ArtifactStore>,
    pub analyzer: DocumentAnalyzer,
    pub notifier: Option<OrderNotifier>,
}
