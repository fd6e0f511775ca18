use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::forwarder::ProcessingTier;
use crate::storage::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: seekreap_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the external processing tier.
    pub processing_tier: Arc<dyn ProcessingTier>,
    /// Local storage for uploaded videos and evidence files.
    pub uploads: Arc<UploadStore>,
}
