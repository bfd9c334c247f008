//! The orchestrator facade.

use std::sync::Arc;

use crate::google::MapsTransport;

use super::config::OrchestratorConfig;
use super::retry::RequestExecutor;

/// Entry point for every batch operation.
///
/// Holds no per-request state: each operation builds its own chunks,
/// futures and accumulators and drops them when it returns.
#[derive(Clone)]
pub struct Orchestrator {
    pub(super) executor: RequestExecutor,
    pub(super) config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn MapsTransport>, config: OrchestratorConfig) -> Self {
        Self {
            executor: RequestExecutor::new(transport, config.retry),
            config,
        }
    }
}
