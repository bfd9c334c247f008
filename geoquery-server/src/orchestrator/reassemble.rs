//! Merging per-chunk, per-mode responses back into input order.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{CommuteResult, TravelMode};
use crate::google::{DistanceMatrixBody, MapsError};

use super::chunk::Chunk;
use super::dispatch::ModeResponses;
use super::retry::Outcome;

/// Commute per mode for one target.
pub type CommuteByMode = BTreeMap<TravelMode, CommuteResult>;

/// Fallback for every mode.
pub fn fallback_commute() -> CommuteByMode {
    TravelMode::ALL
        .iter()
        .map(|&mode| (mode, CommuteResult::fallback()))
        .collect()
}

/// The decoded matrix, if this mode's response is usable at all.
fn usable_matrix(
    mode: TravelMode,
    settled: Option<&Result<Outcome, MapsError>>,
) -> Option<DistanceMatrixBody> {
    let response = match settled? {
        Ok(Outcome::Completed(response)) => response,
        Ok(Outcome::Exhausted { attempts }) => {
            debug!(%mode, attempts, "mode exhausted, using fallback");
            return None;
        }
        Err(e) => {
            warn!(%mode, error = %e, "mode request failed, using fallback");
            return None;
        }
    };

    if !response.status.is_ok() {
        debug!(%mode, status = %response.status, "mode not OK, using fallback");
        return None;
    }

    match response.decode::<DistanceMatrixBody>() {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(%mode, error = %e, "undecodable distance matrix, using fallback");
            None
        }
    }
}

/// Commute for the destination at `local` offset within a chunk.
fn cell(matrix: Option<&DistanceMatrixBody>, local: usize) -> CommuteResult {
    matrix
        .and_then(|m| m.element(local))
        .filter(|element| element.status.is_ok())
        .and_then(|element| element.duration.as_ref())
        .map(|d| CommuteResult::new(d.text.clone(), d.value))
        .unwrap_or_else(CommuteResult::fallback)
}

/// Build one commute map per input target, aligned with input order.
///
/// `responses[i]` belongs to `chunks[i]`. Targets whose chunk or mode had no
/// usable data get the fallback sentinel; nothing here fails.
pub fn reassemble<T>(
    total: usize,
    chunks: &[Chunk<'_, T>],
    responses: &[ModeResponses],
) -> Vec<CommuteByMode> {
    let mut out = vec![fallback_commute(); total];

    for (chunk, settled) in chunks.iter().zip(responses) {
        let matrices: BTreeMap<TravelMode, Option<DistanceMatrixBody>> = TravelMode::ALL
            .iter()
            .map(|&mode| (mode, usable_matrix(mode, settled.get(&mode))))
            .collect();

        for (local, index) in chunk.indices().enumerate() {
            let Some(slot) = out.get_mut(index) else {
                continue;
            };
            for (&mode, matrix) in &matrices {
                slot.insert(mode, cell(matrix.as_ref(), local));
            }
        }
    }

    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::orchestrator::chunk::plan_chunks;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_length_matches_input(n in 0usize..200, size in 1usize..=25) {
            let targets: Vec<usize> = (0..n).collect();
            let chunks = plan_chunks(&targets, size);
            let responses: Vec<ModeResponses> = chunks
                .iter()
                .map(|_| {
                    TravelMode::ALL
                        .iter()
                        .map(|&m| (m, Ok(Outcome::Exhausted { attempts: 1 })))
                        .collect()
                })
                .collect();

            let out = reassemble(n, &chunks, &responses);

            prop_assert_eq!(out.len(), n);
            prop_assert!(out.iter().all(|c| c.len() == 4 && c.values().all(CommuteResult::is_fallback)));
        }
    }
}
