//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::orchestrator::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    /// Cache for the batch routes
    pub cache: ResponseCache,

    /// Deadline for one inbound request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, cache: ResponseCache, request_timeout: Duration) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            cache,
            request_timeout,
        }
    }
}
