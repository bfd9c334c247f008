//! Commute operations: single origin/destination and batched areas.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    Area, CommuteResult, DISTANCE_PLACEHOLDER, DURATION_PLACEHOLDER, SingleCommute, TravelMode,
};
use crate::google::{DistanceMatrixBody, MapsResponse};

use super::chunk::plan_chunks;
use super::dispatch::{MatrixParams, ModeDispatcher, destinations_param};
use super::engine::Orchestrator;
use super::error::QueryError;
use super::reassemble::reassemble;

/// A single commute lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteQuery {
    pub origins: String,
    pub destinations: String,
    /// Provider place id of the destination; used for transit.
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Commutes from one origin to many areas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchCommuteQuery {
    pub origins: String,
    pub areas: Vec<Area>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

/// An input area augmented with its commute per mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaCommute {
    #[serde(flatten)]
    pub area: Area,
    pub commute: BTreeMap<TravelMode, CommuteResult>,
}

/// First element of a matrix response, when both it and the response are OK.
fn first_element(response: &MapsResponse) -> Option<crate::google::MatrixElement> {
    if !response.status.is_ok() {
        return None;
    }
    let body: DistanceMatrixBody = response.decode().ok()?;
    body.element(0).filter(|e| e.status.is_ok()).cloned()
}

fn require_origin(origins: &str) -> Result<(), QueryError> {
    if origins.trim().is_empty() {
        return Err(QueryError::InvalidQuery("origins must not be empty".into()));
    }
    Ok(())
}

impl Orchestrator {
    /// Formatted commute for every mode between one origin and destination.
    ///
    /// Strict: a transport failure or quota exhaustion in any mode fails the
    /// whole call. A mode answered without a usable route gets a placeholder.
    pub async fn compute_single_commute(
        &self,
        query: &CommuteQuery,
        departure_time: i64,
    ) -> Result<SingleCommute, QueryError> {
        require_origin(&query.origins)?;
        if query.destinations.trim().is_empty() {
            return Err(QueryError::InvalidQuery(
                "destinations must not be empty".into(),
            ));
        }

        let params = MatrixParams {
            origins: &query.origins,
            destinations: query.destinations.clone(),
            place_id: query.place_id.as_deref(),
            departure_time: Some(departure_time),
            language: query.language.as_deref(),
            units: query.units.as_deref(),
        };

        let responses = ModeDispatcher::new(&self.executor)
            .dispatch_strict(&params)
            .await?;

        let element = |mode: TravelMode| responses.get(&mode).and_then(first_element);
        let duration = |mode: TravelMode| {
            element(mode)
                .and_then(|e| e.duration)
                .map(|d| d.text)
                .unwrap_or_else(|| DURATION_PLACEHOLDER.to_string())
        };

        Ok(SingleCommute {
            bike: duration(TravelMode::Bicycling),
            car: duration(TravelMode::Driving),
            walk: duration(TravelMode::Walking),
            transit: duration(TravelMode::Transit),
            distance: element(TravelMode::Driving)
                .and_then(|e| e.distance)
                .map(|d| d.text)
                .unwrap_or_else(|| DISTANCE_PLACEHOLDER.to_string()),
        })
    }

    /// Commute per mode from one origin to every area, in input order.
    ///
    /// Chunks are dispatched concurrently, four modes each. Failed or
    /// exhausted modes degrade to the fallback sentinel; only a malformed
    /// query is an error.
    pub async fn compute_batch_commute(
        &self,
        query: BatchCommuteQuery,
    ) -> Result<Vec<AreaCommute>, QueryError> {
        require_origin(&query.origins)?;

        let chunks = plan_chunks(&query.areas, self.config.effective_chunk_size());
        info!(
            areas = query.areas.len(),
            chunks = chunks.len(),
            "computing batch commute"
        );

        let dispatcher = ModeDispatcher::new(&self.executor);
        let per_chunk: Vec<MatrixParams<'_>> = chunks
            .iter()
            .map(|chunk| MatrixParams {
                origins: &query.origins,
                destinations: destinations_param(chunk.items.iter().map(|a| &a.coordinates)),
                place_id: None,
                departure_time: None,
                language: query.language.as_deref(),
                units: query.units.as_deref(),
            })
            .collect();

        let responses = join_all(per_chunk.iter().map(|params| dispatcher.dispatch(params))).await;
        let commutes = reassemble(query.areas.len(), &chunks, &responses);
        debug!(results = commutes.len(), "batch commute reassembled");

        Ok(query
            .areas
            .iter()
            .cloned()
            .zip(commutes)
            .map(|(mut area, commute)| {
                area.extra.remove("commute");
                AreaCommute { area, commute }
            })
            .collect())
    }
}
