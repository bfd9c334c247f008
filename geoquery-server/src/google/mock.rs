//! Scripted transport for tests.
//!
//! Answers every request from a closure and records what was sent, so tests
//! can assert on both results and the exact requests issued.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::error::MapsError;
use super::transport::MapsTransport;
use super::types::{MapsRequest, MapsResponse};

type Responder = dyn Fn(&MapsRequest) -> Result<MapsResponse, MapsError> + Send + Sync;

/// Transport whose responses come from a closure.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<MapsRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&MapsRequest) -> Result<MapsResponse, MapsError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Answer every request with a clone of the same body.
    pub fn always(body: serde_json::Value) -> Self {
        Self::new(move |_| Ok(MapsResponse::from_body(body.clone())))
    }

    /// Wait this long before answering each request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<MapsRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl MapsTransport for ScriptedTransport {
    async fn send(&self, request: &MapsRequest) -> Result<MapsResponse, MapsError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        (self.responder)(request)
    }
}
