//! Batch orchestration of provider requests.
//!
//! Every operation turns one inbound query into many provider requests and
//! folds the answers back into a single result:
//!
//! - [`Orchestrator::compute_single_commute`]: four modes in parallel, strict
//! - [`Orchestrator::compute_batch_commute`]: areas chunked to the provider's
//!   destination limit, every (chunk, mode) pair in parallel, tolerant
//! - [`Orchestrator::resolve_destinations`]: one search per (area, query)
//!   pair, tolerant
//! - [`Orchestrator::search_places`]: terms and pages in sequence, strict
//!
//! All provider traffic goes through a [`RequestExecutor`], which retries
//! rate-limited responses with linear backoff. Dropping any of these futures
//! cancels its pending waits and in-flight requests.

pub mod chunk;
mod commute;
mod config;
mod destination;
mod dispatch;
mod engine;
mod error;
mod lookup;
mod reassemble;
mod retry;
mod search;

pub use chunk::{Chunk, PROVIDER_MAX_DESTINATIONS, plan_chunks};
pub use commute::{AreaCommute, BatchCommuteQuery, CommuteQuery};
pub use config::OrchestratorConfig;
pub use destination::{DestinationQuery, HOSPITAL_QUERY, select_destination};
pub use dispatch::{MatrixParams, ModeDispatcher, ModeResponses, pinned_departure};
pub use engine::Orchestrator;
pub use error::QueryError;
pub use reassemble::{CommuteByMode, fallback_commute, reassemble};
pub use retry::{Outcome, RequestExecutor, RetryPolicy};
pub use search::{SearchQuery, dedup_by_id, split_terms};
