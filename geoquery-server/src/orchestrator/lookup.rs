//! Single-request lookups forwarded to the provider.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::Geometry;
use crate::google::{Endpoint, MapsRequest};

use super::engine::Orchestrator;
use super::error::QueryError;

/// Parameters callers may never set themselves.
const RESERVED_PARAMS: [&str; 1] = ["key"];

#[derive(Debug, Deserialize)]
struct DetailsBody {
    result: DetailsResult,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    geometry: Geometry,
}

fn forwarded(endpoint: Endpoint, params: &[(String, String)]) -> Result<MapsRequest, QueryError> {
    let mut request = MapsRequest::new(endpoint);
    for (name, value) in params {
        if !RESERVED_PARAMS.contains(&name.as_str()) {
            request.set_param(name, value.as_str());
        }
    }
    if request.params.is_empty() {
        return Err(QueryError::InvalidQuery(format!(
            "no parameters for {}",
            endpoint.name()
        )));
    }
    Ok(request)
}

impl Orchestrator {
    /// Forward an autocomplete request and return the provider body as is.
    pub async fn autocomplete(&self, params: &[(String, String)]) -> Result<Value, QueryError> {
        let request = forwarded(Endpoint::Autocomplete, params)?;
        let response = self.executor.execute(&request).await?.require()?;
        debug!(status = %response.status, "autocomplete");
        Ok(response.body)
    }

    /// Look up a place and return only its geometry.
    pub async fn place_geometry(&self, params: &[(String, String)]) -> Result<Geometry, QueryError> {
        let request = forwarded(Endpoint::PlaceDetails, params)?;
        let response = self.executor.execute(&request).await?.require()?;
        if !response.status.is_ok() {
            return Err(QueryError::Provider {
                status: response.status,
                message: response.error_message().unwrap_or_default().to_string(),
            });
        }
        let body: DetailsBody = response.decode()?;
        Ok(body.result.geometry)
    }
}
