//! HTTP route handlers.

use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, RawQuery, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::domain::{Geometry, SearchRecord, SingleCommute};
use crate::orchestrator::{
    BatchCommuteQuery, CommuteQuery, DestinationQuery, QueryError, SearchQuery, pinned_departure,
};

use super::dto::*;
use super::state::AppState;

const AREAS_ROUTE: &str = "/google-distance/areas";
const DESTINATION_ROUTE: &str = "/google-places-destination";

/// Message for provider network failures; details go to the log only.
const BAD_GATEWAY_MESSAGE: &str = "Bad gateway, check server log";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/google-distance", get(single_commute))
        .route(AREAS_ROUTE, post(batch_commute))
        .route("/google-places-search", get(search_places))
        .route(DESTINATION_ROUTE, post(resolve_destinations))
        .route("/google-places-ac", get(autocomplete))
        .route("/google-place-details", get(place_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cached_responses: state.cache.entry_count(),
    })
}

/// Commute by every mode between one origin and one destination.
async fn single_commute(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    query: Result<Query<CommuteQuery>, QueryRejection>,
) -> Result<Json<SingleCommute>, AppError> {
    let query = typed_query(raw, query)?;
    let departure = pinned_departure(&Local::now());

    let commute = with_deadline(
        state.request_timeout,
        state.orchestrator.compute_single_commute(&query, departure),
    )
    .await?;

    Ok(Json(commute))
}

/// Commutes from one origin to many areas. Cached.
async fn batch_commute(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let (key, query): (_, BatchCommuteQuery) = parse_body(AREAS_ROUTE, &body)?;
    let orchestrator = state.orchestrator.clone();

    let entry = state
        .cache
        .get_or_compute(key, || {
            with_deadline(state.request_timeout, async move {
                let areas = orchestrator.compute_batch_commute(query).await?;
                serde_json::to_value(areas).map_err(AppError::from)
            })
        })
        .await?;

    Ok(Json(entry.as_ref().clone()))
}

/// Paginated multi-term place search.
async fn search_places(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchRecord>>, AppError> {
    let query = typed_query(raw, query)?;

    let records = with_deadline(state.request_timeout, state.orchestrator.search_places(&query))
        .await?;

    info!(results = records.len(), "place search complete");
    Ok(Json(records))
}

/// Destination per (area, comparison query) pair. Cached.
async fn resolve_destinations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let (key, query): (_, DestinationQuery) = parse_body(DESTINATION_ROUTE, &body)?;
    let orchestrator = state.orchestrator.clone();

    let entry = state
        .cache
        .get_or_compute(key, || {
            with_deadline(state.request_timeout, async move {
                let results = orchestrator.resolve_destinations(&query).await;
                serde_json::to_value(results).map_err(AppError::from)
            })
        })
        .await?;

    Ok(Json(entry.as_ref().clone()))
}

async fn autocomplete(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params.map_err(AppError::from)?;

    let body = with_deadline(state.request_timeout, state.orchestrator.autocomplete(&params))
        .await?;

    Ok(Json(body))
}

async fn place_details(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Geometry>, AppError> {
    let Query(params) = params.map_err(AppError::from)?;

    let geometry = with_deadline(
        state.request_timeout,
        state.orchestrator.place_geometry(&params),
    )
    .await?;

    Ok(Json(geometry))
}

/// Run `operation` under the request deadline.
///
/// On expiry the operation future is dropped, which cancels its pending
/// retries, page waits and in-flight provider requests.
async fn with_deadline<T, E>(
    limit: Duration,
    operation: impl Future<Output = Result<T, E>>,
) -> Result<T, AppError>
where
    AppError: From<E>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "request deadline exceeded");
            Err(AppError::Timeout)
        }
    }
}

/// Query parameters of a GET route, rejecting a request that has none.
fn typed_query<T>(
    raw: Option<String>,
    parsed: Result<Query<T>, QueryRejection>,
) -> Result<T, AppError> {
    if raw.as_deref().is_none_or(str::is_empty) {
        return Err(AppError::BadRequest {
            message: "query parameters are required".to_string(),
        });
    }
    let Query(query) = parsed?;
    Ok(query)
}

/// Parse a POST body, returning its cache key alongside the typed request.
fn parse_body<T: DeserializeOwned>(
    route: &'static str,
    body: &[u8],
) -> Result<(CacheKey, T), AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest {
            message: "request body is required".to_string(),
        });
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(route, error = %e, "unparseable request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;
    if value.is_null() || value.as_object().is_some_and(|o| o.is_empty()) {
        return Err(AppError::BadRequest {
            message: "request body is required".to_string(),
        });
    }

    let key = ResponseCache::key(route, &value)?;
    let request = T::deserialize(&value).map_err(|e| AppError::BadRequest {
        message: format!("Invalid request: {e}"),
    })?;

    Ok((key, request))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    BadGateway,
    QuotaExhausted { message: String },
    Timeout,
    Internal { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::InvalidQuery(message) => AppError::BadRequest { message },
            QueryError::QuotaExhausted { .. } => AppError::QuotaExhausted {
                message: e.to_string(),
            },
            QueryError::Transport(ref maps) if maps.is_network() => {
                error!(error = %maps, "provider unreachable");
                AppError::BadGateway
            }
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::BadGateway => (StatusCode::BAD_GATEWAY, BAD_GATEWAY_MESSAGE.to_string()),
            AppError::QuotaExhausted { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "request deadline exceeded".to_string(),
            ),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
