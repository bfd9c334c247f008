//! Domain types for the geospatial query aggregator.
//!
//! These are the values that flow between the HTTP layer and the batch
//! orchestrator. Wire names follow the JSON contract of the public API
//! (`areaId`, `municipalityId`, `coordinates.long`, ...).

mod area;
mod commute;
mod destination;
mod mode;
mod place;

pub use area::{Area, Coordinates, Identifier};
pub use commute::{CommuteResult, DISTANCE_PLACEHOLDER, DURATION_PLACEHOLDER, SingleCommute};
pub use destination::{CompareQuery, Destination, DestinationResult};
pub use mode::TravelMode;
pub use place::{Geometry, LatLng, SearchRecord};
