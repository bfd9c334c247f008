//! Provider request/response types.
//!
//! The DTOs map directly to the Google Maps JSON responses. They use
//! `#[serde(default)]` liberally because the provider omits empty arrays.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::SearchRecord;

use super::error::MapsError;

/// Provider endpoints used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DistanceMatrix,
    TextSearch,
    Autocomplete,
    PlaceDetails,
}

impl Endpoint {
    /// Path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DistanceMatrix => "distancematrix/json",
            Endpoint::TextSearch => "place/textsearch/json",
            Endpoint::Autocomplete => "place/autocomplete/json",
            Endpoint::PlaceDetails => "place/details/json",
        }
    }

    /// Short name, used for logging and fixture file names.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::DistanceMatrix => "distancematrix",
            Endpoint::TextSearch => "textsearch",
            Endpoint::Autocomplete => "autocomplete",
            Endpoint::PlaceDetails => "details",
        }
    }

    pub const ALL: [Endpoint; 4] = [
        Endpoint::DistanceMatrix,
        Endpoint::TextSearch,
        Endpoint::Autocomplete,
        Endpoint::PlaceDetails,
    ];
}

/// One request to the provider: an endpoint plus query parameters.
///
/// The API key is not part of the request; transports add it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
}

impl MapsRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// Set a parameter, replacing any previous value for the same name.
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    /// Set a parameter only when a value is present.
    pub fn with_optional(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with_param(name, v),
            None => self,
        }
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name.to_string(), value)),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Top-level `status` reported by every provider endpoint, and per element
/// in distance matrix responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    ZeroResults,
    NotFound,
    OverQueryLimit,
    OverDailyLimit,
    RequestDenied,
    InvalidRequest,
    MaxElementsExceeded,
    MaxDimensionsExceeded,
    MaxRouteLengthExceeded,
    UnknownError,
    #[serde(other)]
    Unrecognized,
}

impl ApiStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiStatus::Ok)
    }

    /// The provider's rate-limit signal; the only status that is retried.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ApiStatus::OverQueryLimit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Ok => "OK",
            ApiStatus::ZeroResults => "ZERO_RESULTS",
            ApiStatus::NotFound => "NOT_FOUND",
            ApiStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ApiStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            ApiStatus::RequestDenied => "REQUEST_DENIED",
            ApiStatus::InvalidRequest => "INVALID_REQUEST",
            ApiStatus::MaxElementsExceeded => "MAX_ELEMENTS_EXCEEDED",
            ApiStatus::MaxDimensionsExceeded => "MAX_DIMENSIONS_EXCEEDED",
            ApiStatus::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED",
            ApiStatus::UnknownError => "UNKNOWN_ERROR",
            ApiStatus::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider response: the parsed top-level status and the raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct MapsResponse {
    pub status: ApiStatus,
    pub body: serde_json::Value,
}

impl MapsResponse {
    /// Wrap a body, reading its `status` field.
    pub fn from_body(body: serde_json::Value) -> Self {
        let status = body
            .get("status")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or(ApiStatus::Unrecognized);
        Self { status, body }
    }

    /// A body-less response carrying only a status.
    pub fn with_status(status: ApiStatus) -> Self {
        Self {
            status,
            body: serde_json::json!({ "status": status.as_str() }),
        }
    }

    /// Decode the body into a typed DTO.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, MapsError> {
        T::deserialize(&self.body).map_err(|e| MapsError::Json {
            message: e.to_string(),
        })
    }

    /// Provider's `error_message`, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error_message").and_then(|m| m.as_str())
    }
}

/// Response from the distance matrix endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceMatrixBody {
    pub status: ApiStatus,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl DistanceMatrixBody {
    /// Element for the single origin at destination offset `idx`.
    pub fn element(&self, idx: usize) -> Option<&MatrixElement> {
        self.rows.first().and_then(|row| row.elements.get(idx))
    }
}

/// One origin's row of the matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// One origin/destination cell.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixElement {
    pub status: ApiStatus,
    pub duration: Option<TextValue>,
    pub distance: Option<TextValue>,
}

/// Human-readable text plus the raw value (seconds or metres).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

/// One page of text search results.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSearchBody {
    pub status: ApiStatus,
    #[serde(default, deserialize_with = "lenient_records")]
    pub results: Vec<SearchRecord>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<SearchRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(SearchRecord::from_provider).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_params_replace() {
        let req = MapsRequest::new(Endpoint::DistanceMatrix)
            .with_param("mode", "walking")
            .with_param("mode", "transit")
            .with_optional("language", None)
            .with_optional("units", Some("metric"));

        assert_eq!(req.param("mode"), Some("transit"));
        assert_eq!(req.param("language"), None);
        assert_eq!(req.param("units"), Some("metric"));
        assert_eq!(req.params.len(), 2);
    }

    #[test]
    fn status_from_body() {
        let resp = MapsResponse::from_body(json!({ "status": "OVER_QUERY_LIMIT" }));
        assert!(resp.status.is_quota_exhausted());

        let resp = MapsResponse::from_body(json!({ "status": "SOMETHING_NEW" }));
        assert_eq!(resp.status, ApiStatus::Unrecognized);

        let resp = MapsResponse::from_body(json!({ "predictions": [] }));
        assert_eq!(resp.status, ApiStatus::Unrecognized);
    }

    #[test]
    fn decode_distance_matrix() {
        let resp = MapsResponse::from_body(json!({
            "status": "OK",
            "rows": [{ "elements": [
                { "status": "OK",
                  "duration": { "text": "12 mins", "value": 720 },
                  "distance": { "text": "3.1 km", "value": 3100 } },
                { "status": "ZERO_RESULTS" }
            ]}]
        }));
        let body: DistanceMatrixBody = resp.decode().unwrap();

        assert!(body.status.is_ok());
        let first = body.element(0).unwrap();
        assert_eq!(first.duration.as_ref().unwrap().value, 720);
        assert_eq!(body.element(1).unwrap().status, ApiStatus::ZeroResults);
        assert!(body.element(2).is_none());
    }

    #[test]
    fn decode_failure_is_json_error() {
        let resp = MapsResponse::from_body(json!({ "status": "OK", "rows": 5 }));
        let err = resp.decode::<DistanceMatrixBody>().unwrap_err();
        assert!(matches!(err, MapsError::Json { .. }));
    }

    #[test]
    fn status_round_trips_as_str() {
        for status in [ApiStatus::Ok, ApiStatus::ZeroResults, ApiStatus::RequestDenied] {
            assert_eq!(MapsResponse::with_status(status).status, status);
        }
    }
}
