//! Fixture transport for running without provider access.
//!
//! Loads one canned response body per endpoint from JSON files and serves
//! it for every request to that endpoint.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use super::error::MapsError;
use super::transport::MapsTransport;
use super::types::{Endpoint, MapsRequest, MapsResponse};

/// Transport that serves data from JSON files.
///
/// Expects files named after [`Endpoint::name`], e.g. `distancematrix.json`
/// or `textsearch.json`. Endpoints without a file answer `ZERO_RESULTS`.
#[derive(Debug, Clone)]
pub struct FixtureTransport {
    bodies: HashMap<Endpoint, serde_json::Value>,
}

impl FixtureTransport {
    /// Load fixtures from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, MapsError> {
        let data_dir = data_dir.as_ref();
        if !data_dir.is_dir() {
            return Err(MapsError::Fixture(format!(
                "{} is not a directory",
                data_dir.display()
            )));
        }

        let mut bodies = HashMap::new();
        for endpoint in Endpoint::ALL {
            let path = data_dir.join(format!("{}.json", endpoint.name()));
            if !path.is_file() {
                continue;
            }

            let json = std::fs::read_to_string(&path)
                .map_err(|e| MapsError::Fixture(format!("failed to read {path:?}: {e}")))?;
            let body: serde_json::Value = serde_json::from_str(&json)
                .map_err(|e| MapsError::Fixture(format!("failed to parse {path:?}: {e}")))?;

            bodies.insert(endpoint, body);
        }

        if bodies.is_empty() {
            return Err(MapsError::Fixture(format!(
                "no fixture files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self { bodies })
    }

    /// Endpoints that have a fixture loaded.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints: Vec<_> = self.bodies.keys().copied().collect();
        endpoints.sort_by_key(|e| e.name());
        endpoints
    }
}

#[async_trait]
impl MapsTransport for FixtureTransport {
    async fn send(&self, request: &MapsRequest) -> Result<MapsResponse, MapsError> {
        Ok(match self.bodies.get(&request.endpoint) {
            Some(body) => MapsResponse::from_body(body.clone()),
            None => MapsResponse::with_status(super::types::ApiStatus::ZeroResults),
        })
    }
}
