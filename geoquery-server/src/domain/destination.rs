//! Destination lookups: which point a comparison query resolves to per area.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::area::Identifier;
use super::place::LatLng;

const UNRESOLVED_MARKER: &str = "-";

/// One comparison criterion, e.g. "closest hospital".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareQuery {
    /// Free-text search, e.g. "Sjukhus".
    #[serde(default)]
    pub query: Option<String>,
    /// Provider category, e.g. "hospital".
    #[serde(default)]
    pub google_type: Option<String>,
    /// Caller-defined label echoed back in the result.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A resolved point, or the marker for "no destination found".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination {
    Resolved(LatLng),
    Unresolved,
}

impl Destination {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Destination::Resolved(_))
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Destination::Resolved(point) => point.serialize(serializer),
            Destination::Unresolved => serializer.serialize_str(UNRESOLVED_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Point(LatLng),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Point(p) => Ok(Destination::Resolved(p)),
            Repr::Marker(s) if s == UNRESOLVED_MARKER => Ok(Destination::Unresolved),
            Repr::Marker(s) => Err(serde::de::Error::custom(format!(
                "unexpected destination marker {s:?}"
            ))),
        }
    }
}

/// Destination for one (area, comparison query) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationResult {
    pub area_id: Identifier,
    pub municipality_id: Identifier,
    pub destination: Destination,
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn destination_wire_format() {
        let resolved = Destination::Resolved(LatLng { lat: 1.0, lng: 2.0 });
        assert_eq!(
            serde_json::to_value(resolved).unwrap(),
            json!({ "lat": 1.0, "lng": 2.0 })
        );
        assert_eq!(serde_json::to_value(Destination::Unresolved).unwrap(), json!("-"));

        let parsed: Destination = serde_json::from_value(json!("-")).unwrap();
        assert_eq!(parsed, Destination::Unresolved);
        assert!(serde_json::from_value::<Destination>(json!("?")).is_err());
    }

    #[test]
    fn result_uses_camel_case_and_type() {
        let result = DestinationResult {
            area_id: Identifier::Number(3),
            municipality_id: "0180".into(),
            destination: Destination::Unresolved,
            kind: "hospital".into(),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "areaId": 3,
                "municipalityId": "0180",
                "destination": "-",
                "type": "hospital"
            })
        );
    }

    #[test]
    fn compare_query_parses_optional_fields() {
        let q: CompareQuery =
            serde_json::from_value(json!({ "googleType": "school", "type": "school" })).unwrap();
        assert_eq!(q.query, None);
        assert_eq!(q.google_type.as_deref(), Some("school"));
        assert_eq!(q.kind, "school");
    }
}
