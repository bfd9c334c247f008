//! Commute results.

use serde::{Deserialize, Serialize};

/// Placeholder for a duration the provider could not produce.
pub const DURATION_PLACEHOLDER: &str = "- min";

/// Placeholder for a distance the provider could not produce.
pub const DISTANCE_PLACEHOLDER: &str = "- km";

/// One mode's commute for one area: display text plus the raw value in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuteResult {
    pub text: String,
    pub value: u64,
}

impl CommuteResult {
    pub fn new(text: impl Into<String>, value: u64) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }

    /// The sentinel substituted when a mode or chunk produced no usable data.
    pub fn fallback() -> Self {
        Self::new("-", 0)
    }

    pub fn is_fallback(&self) -> bool {
        self.text == "-" && self.value == 0
    }
}

/// Formatted commute summary for a single origin/destination pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleCommute {
    pub bike: String,
    pub car: String,
    pub walk: String,
    pub transit: String,
    /// Driving distance.
    pub distance: String,
}

impl Default for SingleCommute {
    fn default() -> Self {
        Self {
            bike: DURATION_PLACEHOLDER.to_string(),
            car: DURATION_PLACEHOLDER.to_string(),
            walk: DURATION_PLACEHOLDER.to_string(),
            transit: DURATION_PLACEHOLDER.to_string(),
            distance: DISTANCE_PLACEHOLDER.to_string(),
        }
    }
}
