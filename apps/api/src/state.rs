use std::sync::Arc;

use crate::config::Config;
use crate::lp::store::LpStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for LP settings records. Postgres in production, memory for local runs.
    pub store: Arc<dyn LpStore>,
    pub config: Config,
}
