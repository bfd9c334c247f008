//! Destination resolution: one representative point per (area, query) pair.
//!
//! Every pair is searched concurrently. Each search settles to its own
//! [`DestinationResult`]; a failed or empty search becomes an unresolved
//! entry, so the output always has `areas x queries` entries in product order.

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{Area, CompareQuery, Destination, DestinationResult, LatLng, SearchRecord};
use crate::google::{Endpoint, MapsRequest, PlacesSearchBody};

use super::engine::Orchestrator;
use super::retry::Outcome;

/// Query text that triggers hospital disambiguation.
pub const HOSPITAL_QUERY: &str = "Sjukhus";

/// Name fragments that identify an actual hospital (as opposed to, say, a
/// pharmacy on a hospital street).
const HOSPITAL_NAME_MARKERS: [&str; 2] = ["sjukhus", "lasarett"];

/// Destination lookups for a set of areas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationQuery {
    pub areas: Vec<Area>,
    pub compare_queries: Vec<CompareQuery>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub rankby: Option<String>,
}

fn is_hospital(record: &SearchRecord) -> bool {
    let name = record.name.to_lowercase();
    HOSPITAL_NAME_MARKERS.iter().any(|m| name.contains(m)) && record.has_type("hospital")
}

/// Pick the destination among ranked search results.
///
/// For the hospital query the first real hospital wins; otherwise the
/// first-ranked result.
pub fn select_destination(query_text: Option<&str>, results: &[SearchRecord]) -> Option<LatLng> {
    if query_text == Some(HOSPITAL_QUERY) {
        results
            .iter()
            .find(|r| is_hospital(r))
            .and_then(SearchRecord::location)
    } else {
        results.first().and_then(SearchRecord::location)
    }
}

fn search_request(
    query: &DestinationQuery,
    area: &Area,
    compare: &CompareQuery,
) -> MapsRequest {
    MapsRequest::new(Endpoint::TextSearch)
        .with_optional("query", compare.query.as_deref())
        .with_optional("type", compare.google_type.as_deref())
        .with_param("location", area.coordinates.to_param())
        .with_optional("language", query.language.as_deref())
        .with_optional("rankby", query.rankby.as_deref())
}

impl Orchestrator {
    /// Resolve a destination for every (area, comparison query) pair.
    ///
    /// Never fails: each pair yields exactly one result, unresolved when the
    /// search failed, was exhausted or found nothing suitable.
    pub async fn resolve_destinations(&self, query: &DestinationQuery) -> Vec<DestinationResult> {
        let pairs: Vec<(&Area, &CompareQuery)> = query
            .areas
            .iter()
            .flat_map(|area| query.compare_queries.iter().map(move |c| (area, c)))
            .collect();
        info!(pairs = pairs.len(), "resolving destinations");

        let results = join_all(
            pairs
                .iter()
                .map(|&(area, compare)| self.resolve_pair(query, area, compare)),
        )
        .await;

        let resolved = results
            .iter()
            .filter(|r| r.destination.is_resolved())
            .count();
        debug!(
            resolved,
            unresolved = results.len() - resolved,
            "destinations settled"
        );
        results
    }

    async fn resolve_pair(
        &self,
        query: &DestinationQuery,
        area: &Area,
        compare: &CompareQuery,
    ) -> DestinationResult {
        let request = search_request(query, area, compare);
        let destination = match self.executor.execute(&request).await {
            Ok(Outcome::Completed(response)) if response.status.is_ok() => {
                match response.decode::<PlacesSearchBody>() {
                    Ok(body) => select_destination(compare.query.as_deref(), &body.results)
                        .map(Destination::Resolved)
                        .unwrap_or(Destination::Unresolved),
                    Err(e) => {
                        warn!(area = %area.area_id, kind = %compare.kind, error = %e, "undecodable search response");
                        Destination::Unresolved
                    }
                }
            }
            Ok(Outcome::Completed(response)) => {
                debug!(area = %area.area_id, kind = %compare.kind, status = %response.status, "no destination");
                Destination::Unresolved
            }
            Ok(Outcome::Exhausted { attempts }) => {
                warn!(area = %area.area_id, kind = %compare.kind, attempts, "destination search exhausted");
                Destination::Unresolved
            }
            Err(e) => {
                warn!(area = %area.area_id, kind = %compare.kind, error = %e, "destination search failed");
                Destination::Unresolved
            }
        };

        DestinationResult {
            area_id: area.area_id.clone(),
            municipality_id: area.municipality_id.clone(),
            destination,
            kind: compare.kind.clone(),
        }
    }
}
