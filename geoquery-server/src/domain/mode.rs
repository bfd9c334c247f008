//! Travel modes supported by the distance matrix.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A commute method. The set is fixed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Bicycling,
    Driving,
    Walking,
    Transit,
}

impl TravelMode {
    /// Every mode, in the order results are reported.
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Bicycling,
        TravelMode::Driving,
        TravelMode::Walking,
        TravelMode::Transit,
    ];

    /// The provider's `mode` parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Bicycling => "bicycling",
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
