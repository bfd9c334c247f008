//! Data transfer objects owned by the web layer.
//!
//! Request bodies and results are the orchestrator's own types; only the
//! envelopes below exist purely for HTTP.

use serde::{Deserialize, Serialize};

/// Error body for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// Responses currently held by the batch cache
    pub cached_responses: u64,
}
