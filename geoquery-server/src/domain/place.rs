//! Place records returned by the provider's text search.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A latitude/longitude pair in the provider's own naming (`lng`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Geometry block of a place record. Only `location` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A provider place record.
///
/// The fields used for disambiguation and deduplication are typed; the rest
/// of the record is carried through untouched so clients see the full result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchRecord {
    /// Decodes one provider record without rejecting it over a malformed field.
    ///
    /// An interpreted field whose shape is unexpected (a geometry without a
    /// location, non-string types) is left untyped in `extra`. Only non-object
    /// records yield `None`.
    pub fn from_provider(value: Value) -> Option<Self> {
        if let Ok(record) = Self::deserialize(&value) {
            return Some(record);
        }
        let Value::Object(mut map) = value else {
            return None;
        };
        Some(Self {
            id: take_typed(&mut map, "id"),
            place_id: take_typed(&mut map, "place_id"),
            name: take_typed(&mut map, "name").unwrap_or_default(),
            types: take_typed(&mut map, "types").unwrap_or_default(),
            geometry: take_typed(&mut map, "geometry"),
            extra: map,
        })
    }

    /// Key used when merging results of several search terms.
    ///
    /// Falls back to `place_id` for records that carry no legacy `id`.
    pub fn dedup_key(&self) -> Option<&str> {
        self.id.as_deref().or(self.place_id.as_deref())
    }

    pub fn location(&self) -> Option<LatLng> {
        self.geometry.as_ref().map(|g| g.location)
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// Removes `key` from `map` only if it decodes as `T`.
fn take_typed<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let typed = T::deserialize(map.get(key)?).ok()?;
    map.remove(key);
    Some(typed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_record() {
        let json = r#"{
            "id": "abc",
            "place_id": "ChIJ123",
            "name": "Sahlgrenska",
            "types": ["hospital", "health"],
            "geometry": { "location": { "lat": 57.68, "lng": 11.96 }, "viewport": {} },
            "rating": 4.1
        }"#;
        let record: SearchRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.dedup_key(), Some("abc"));
        assert!(record.has_type("hospital"));
        assert_eq!(record.location(), Some(LatLng { lat: 57.68, lng: 11.96 }));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["rating"], 4.1);
        assert!(back["geometry"]["viewport"].is_object());
    }

    #[test]
    fn dedup_key_falls_back_to_place_id() {
        let record: SearchRecord =
            serde_json::from_str(r#"{ "place_id": "p1", "name": "x" }"#).unwrap();
        assert_eq!(record.dedup_key(), Some("p1"));

        let record: SearchRecord = serde_json::from_str(r#"{ "name": "x" }"#).unwrap();
        assert_eq!(record.dedup_key(), None);
        assert!(record.location().is_none());
    }

    #[test]
    fn malformed_fields_are_kept_untyped() {
        let record = SearchRecord::from_provider(serde_json::json!({
            "id": "odd",
            "name": "Vårdcentral",
            "types": ["hospital", 7],
            "geometry": { "viewport": {} }
        }))
        .unwrap();

        assert_eq!(record.dedup_key(), Some("odd"));
        assert_eq!(record.name, "Vårdcentral");
        assert!(record.types.is_empty());
        assert!(record.location().is_none());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["types"], serde_json::json!(["hospital", 7]));
        assert!(back["geometry"]["viewport"].is_object());
    }

    #[test]
    fn non_object_record_is_dropped() {
        assert!(SearchRecord::from_provider(serde_json::json!("junk")).is_none());
        assert!(SearchRecord::from_provider(serde_json::json!({ "name": "ok" })).is_some());
    }
}
