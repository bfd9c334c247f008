//! Web layer: the HTTP routes in front of the orchestrator.
//!
//! Handlers parse and validate the request, run one orchestrator operation
//! under the request deadline and map failures to status codes. The two POST
//! batch routes answer from the response cache when they can.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
