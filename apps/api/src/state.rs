use std::sync::Arc;

use crate::config::Config;
use crate::selection::engine::SelectionEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Validated at start-up. Holds the pluggable scorer and the shared score cache.
    pub engine: Arc<SelectionEngine>,
}
