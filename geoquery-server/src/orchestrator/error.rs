//! Orchestration errors.
//!
//! Only strict operations (single commute, search, lookups) return these.
//! Batch operations absorb per-item failures as fallback values.

use crate::google::{ApiStatus, MapsError};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The transport failed or the body could not be decoded
    #[error(transparent)]
    Transport(#[from] MapsError),

    /// Every attempt was answered with a rate-limit status
    #[error("provider quota exhausted after {attempts} attempts")]
    QuotaExhausted { attempts: u32 },

    /// The provider refused the request
    #[error("provider rejected request with {status}: {message}")]
    Provider { status: ApiStatus, message: String },

    /// The query was malformed; nothing was sent
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
