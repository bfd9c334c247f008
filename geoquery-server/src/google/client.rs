//! Google Maps HTTP client.
//!
//! Sends one request per call. Adds the API key, limits concurrency with a
//! semaphore and turns HTTP-level failures into [`MapsError`]. Provider-level
//! statuses in the body are returned as-is for the orchestrator to judge.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::MapsError;
use super::transport::MapsTransport;
use super::types::{ApiStatus, MapsRequest, MapsResponse};

/// Default base URL for the Maps web services.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Configuration for the Google client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GoogleConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Google Maps web service client.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl GoogleClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GoogleConfig) -> Result<Self, MapsError> {
        if config.max_concurrent == 0 {
            return Err(MapsError::InvalidRequest(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn url_for(&self, request: &MapsRequest) -> String {
        format!("{}/{}", self.base_url, request.endpoint.path())
    }
}

#[async_trait]
impl MapsTransport for GoogleClient {
    async fn send(&self, request: &MapsRequest) -> Result<MapsResponse, MapsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MapsError::Transport("semaphore closed".to_string()))?;

        let url = self.url_for(request);
        debug!(endpoint = request.endpoint.name(), "sending provider request");

        let response = self
            .http
            .get(&url)
            .query(&request.params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MapsError::Unauthorized);
        }

        // Surfaced as a quota response so the executor's backoff applies.
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(MapsResponse::with_status(ApiStatus::OverQueryLimit));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| MapsError::Json {
            message: format!("{e} (body: {})", body.chars().take(500).collect::<String>()),
        })?;

        Ok(MapsResponse::from_body(json))
    }
}
