//! Google Maps web service boundary.
//!
//! The orchestrator only sees the [`MapsTransport`] trait: "issue one
//! request, get back a status plus a JSON body, or a transport failure".
//! Three transports exist:
//!
//! - [`GoogleClient`] talks to the real provider over HTTPS
//! - [`FixtureTransport`] serves canned bodies from a directory, for running
//!   the server without an API key
//! - [`mock::ScriptedTransport`] answers from a closure and records every
//!   request, for tests
//!
//! Key characteristics of the provider:
//! - Rate limiting is reported *in the body* (`"status": "OVER_QUERY_LIMIT"`)
//!   with HTTP 200, so quota exhaustion is a response, not an error
//! - The distance matrix accepts at most 25 destinations per request
//! - Text search pages are chained with `next_page_token`, which only becomes
//!   valid a short while after it is issued

mod client;
mod error;
mod fixture;
pub mod mock;
mod transport;
mod types;

pub use client::{GoogleClient, GoogleConfig};
pub use error::MapsError;
pub use fixture::FixtureTransport;
pub use transport::MapsTransport;
pub use types::{
    ApiStatus, DistanceMatrixBody, Endpoint, MapsRequest, MapsResponse, MatrixElement, MatrixRow,
    PlacesSearchBody, TextValue,
};
