//! Query targets ("areas") and coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate as sent by clients.
///
/// The longitude field is called `long` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Format as the provider's `lat,lng` parameter syntax.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.lat, self.long)
    }
}

/// An area or municipality identifier.
///
/// Clients send either numeric or string ids; both are echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Number(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

/// A query target: one area of a municipality with a representative point.
///
/// Fields the aggregator does not understand are kept in `extra` and
/// serialized back, so clients get their own records returned augmented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub area_id: Identifier,
    pub municipality_id: Identifier,
    pub coordinates: Coordinates,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Area {
    pub fn new(
        area_id: impl Into<Identifier>,
        municipality_id: impl Into<Identifier>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            area_id: area_id.into(),
            municipality_id: municipality_id.into(),
            coordinates,
            extra: serde_json::Map::new(),
        }
    }
}
