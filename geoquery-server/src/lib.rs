//! Geospatial query orchestration server.
//!
//! Answers "how far is everything from here?" for a list of map areas:
//! commute times by travel mode, the nearest destination of a kind per area,
//! and paginated place searches. Each answer fans out into many rate-limited
//! Google Maps requests; this crate plans, retries and reassembles them.

pub mod cache;
pub mod config;
pub mod domain;
pub mod google;
pub mod orchestrator;
pub mod web;
