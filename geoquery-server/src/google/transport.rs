//! The abstract "issue one provider request" capability.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::MapsError;
use super::types::{MapsRequest, MapsResponse};

/// Sends a single request to the maps provider.
///
/// Implementations must not retry: quota handling belongs to the
/// orchestrator's executor. A response whose body reports a provider-level
/// failure (`OVER_QUERY_LIMIT`, `ZERO_RESULTS`, ...) is still `Ok`.
#[async_trait]
pub trait MapsTransport: Send + Sync {
    async fn send(&self, request: &MapsRequest) -> Result<MapsResponse, MapsError>;
}

#[async_trait]
impl<T: MapsTransport + ?Sized> MapsTransport for Arc<T> {
    async fn send(&self, request: &MapsRequest) -> Result<MapsResponse, MapsError> {
        (**self).send(request).await
    }
}
