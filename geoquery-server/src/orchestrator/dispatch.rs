//! Concurrent per-mode dispatch.
//!
//! For one chunk (or one single-target query) the dispatcher sends one
//! distance matrix request per travel mode, all at once.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, TimeZone};
use futures::future::{join_all, try_join_all};

use crate::domain::{Coordinates, TravelMode};
use crate::google::{Endpoint, MapsError, MapsRequest, MapsResponse};

use super::error::QueryError;
use super::retry::{Outcome, RequestExecutor};

/// Prefix the provider expects for place-id destinations.
const PLACE_ID_PREFIX: &str = "place_id:";

/// Hour of the pinned departure time.
const DEPARTURE_HOUR: u32 = 8;

/// Settled result of every mode's request, keyed by mode.
pub type ModeResponses = BTreeMap<TravelMode, Result<Outcome, MapsError>>;

/// Parameters shared by every mode's request.
#[derive(Debug, Clone, Default)]
pub struct MatrixParams<'a> {
    pub origins: &'a str,
    pub destinations: String,
    /// Replaces `destinations` for transit when present.
    pub place_id: Option<&'a str>,
    pub departure_time: Option<i64>,
    pub language: Option<&'a str>,
    pub units: Option<&'a str>,
}

impl MatrixParams<'_> {
    /// Build the distance matrix request for one mode.
    pub fn request_for(&self, mode: TravelMode) -> MapsRequest {
        let destinations = match (mode, self.place_id) {
            (TravelMode::Transit, Some(place_id)) => format!("{PLACE_ID_PREFIX}{place_id}"),
            _ => self.destinations.clone(),
        };

        MapsRequest::new(Endpoint::DistanceMatrix)
            .with_param("origins", self.origins)
            .with_param("destinations", destinations)
            .with_param("mode", mode.as_str())
            .with_optional(
                "departure_time",
                self.departure_time.map(|t| t.to_string()).as_deref(),
            )
            .with_optional("language", self.language)
            .with_optional("units", self.units)
    }
}

/// Format a destination list as `lat,long|lat,long|...`.
pub fn destinations_param<'a>(points: impl IntoIterator<Item = &'a Coordinates>) -> String {
    points
        .into_iter()
        .map(Coordinates::to_param)
        .collect::<Vec<_>>()
        .join("|")
}

/// Departure time used for single commute queries, as a unix timestamp.
///
/// 08:00 on the Monday of the following week (weeks starting on Sunday), so
/// repeated lookups during a week see the same traffic model.
pub fn pinned_departure<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let today = now.date_naive();
    let since_sunday = i64::from(today.weekday().num_days_from_sunday());
    let monday = today - Duration::days(since_sunday) + Duration::days(8);
    let naive = monday
        .and_hms_opt(DEPARTURE_HOUR, 0, 0)
        .unwrap_or_else(|| monday.and_time(chrono::NaiveTime::MIN));

    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| naive.and_utc().timestamp())
}

/// Issues one request per travel mode through the executor.
pub struct ModeDispatcher<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> ModeDispatcher<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Tolerant join: every mode settles, failures are kept per mode.
    pub async fn dispatch(&self, params: &MatrixParams<'_>) -> ModeResponses {
        let requests: Vec<_> = TravelMode::ALL
            .iter()
            .map(|&mode| (mode, params.request_for(mode)))
            .collect();

        let settled = join_all(requests.iter().map(|(mode, request)| async move {
            (*mode, self.executor.execute(request).await)
        }))
        .await;

        settled.into_iter().collect()
    }

    /// Strict join: the first failing mode fails the whole dispatch.
    ///
    /// Remaining in-flight requests are dropped when that happens.
    pub async fn dispatch_strict(
        &self,
        params: &MatrixParams<'_>,
    ) -> Result<BTreeMap<TravelMode, MapsResponse>, QueryError> {
        let requests: Vec<_> = TravelMode::ALL
            .iter()
            .map(|&mode| (mode, params.request_for(mode)))
            .collect();

        let responses = try_join_all(requests.iter().map(|(mode, request)| async move {
            let outcome = self.executor.execute(request).await?;
            Ok::<_, QueryError>((*mode, outcome.require()?))
        }))
        .await?;

        Ok(responses.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::Utc;
    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::google::ApiStatus;
    use crate::google::mock::ScriptedTransport;
    use crate::orchestrator::RetryPolicy;

    fn params() -> MatrixParams<'static> {
        MatrixParams {
            origins: "57.7,11.9",
            destinations: "57.6,11.8".into(),
            place_id: Some("ChIJabc"),
            departure_time: Some(1_700_000_000),
            language: Some("sv"),
            units: None,
        }
    }

    #[test]
    fn transit_uses_place_id() {
        let p = params();
        let transit = p.request_for(TravelMode::Transit);
        let walking = p.request_for(TravelMode::Walking);

        assert_eq!(transit.param("destinations"), Some("place_id:ChIJabc"));
        assert_eq!(walking.param("destinations"), Some("57.6,11.8"));
        assert_eq!(walking.param("mode"), Some("walking"));
        assert_eq!(walking.param("departure_time"), Some("1700000000"));
        assert_eq!(walking.param("language"), Some("sv"));
        assert_eq!(walking.param("units"), None);
    }

    #[test]
    fn transit_without_place_id_keeps_coordinates() {
        let mut p = params();
        p.place_id = None;
        let transit = p.request_for(TravelMode::Transit);
        assert_eq!(transit.param("destinations"), Some("57.6,11.8"));
    }

    #[test]
    fn destinations_are_pipe_separated() {
        let points = [Coordinates::new(1.0, 2.0), Coordinates::new(3.5, 4.25)];
        assert_eq!(destinations_param(&points), "1,2|3.5,4.25");
    }

    #[test]
    fn departure_is_next_weeks_monday_at_eight() {
        // Wednesday 2024-03-13 -> Monday 2024-03-18 08:00 UTC
        let now = Utc.with_ymd_and_hms(2024, 3, 13, 15, 42, 10).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 18, 8, 0, 0).unwrap();
        assert_eq!(pinned_departure(&now), expected.timestamp());

        // Sunday 2024-03-17 -> Monday 2024-03-25 (week starts on Sunday)
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 9, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 25, 8, 0, 0).unwrap();
        assert_eq!(pinned_departure(&now), expected.timestamp());

        // Saturday 2024-03-16 -> Monday 2024-03-18
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 23, 59, 59).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 18, 8, 0, 0).unwrap();
        assert_eq!(pinned_departure(&now), expected.timestamp());
    }

    #[tokio::test(start_paused = true)]
    async fn modes_are_dispatched_concurrently() {
        let transport = Arc::new(
            ScriptedTransport::always(json!({ "status": "OK", "rows": [] }))
                .with_latency(StdDuration::from_secs(1)),
        );
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::immediate(1));
        let dispatcher = ModeDispatcher::new(&executor);

        let start = Instant::now();
        let responses = dispatcher.dispatch(&params()).await;

        assert_eq!(responses.len(), 4);
        assert_eq!(transport.request_count(), 4);
        assert_eq!(start.elapsed(), StdDuration::from_secs(1));
    }

    #[tokio::test]
    async fn one_exhausted_mode_does_not_cancel_others() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.param("mode") == Some("driving") {
                Ok(MapsResponse::with_status(ApiStatus::OverQueryLimit))
            } else {
                Ok(MapsResponse::from_body(json!({ "status": "OK" })))
            }
        }));
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::immediate(3));
        let dispatcher = ModeDispatcher::new(&executor);

        let responses = dispatcher.dispatch(&params()).await;

        assert!(matches!(
            responses[&TravelMode::Driving],
            Ok(Outcome::Exhausted { attempts: 3 })
        ));
        for mode in [TravelMode::Bicycling, TravelMode::Walking, TravelMode::Transit] {
            assert!(matches!(responses[&mode], Ok(Outcome::Completed(_))));
        }
        // 3 driving attempts plus one each for the others.
        assert_eq!(transport.request_count(), 6);
    }

    #[tokio::test]
    async fn strict_dispatch_fails_on_exhaustion() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.param("mode") == Some("walking") {
                Ok(MapsResponse::with_status(ApiStatus::OverQueryLimit))
            } else {
                Ok(MapsResponse::from_body(json!({ "status": "OK" })))
            }
        }));
        let executor = RequestExecutor::new(transport, RetryPolicy::immediate(2));
        let dispatcher = ModeDispatcher::new(&executor);

        let err = dispatcher.dispatch_strict(&params()).await.unwrap_err();
        assert!(matches!(err, QueryError::QuotaExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn strict_dispatch_returns_every_mode() {
        let transport = Arc::new(ScriptedTransport::always(json!({ "status": "OK" })));
        let executor = RequestExecutor::new(transport, RetryPolicy::immediate(2));
        let dispatcher = ModeDispatcher::new(&executor);

        let responses = dispatcher.dispatch_strict(&params()).await.unwrap();
        assert_eq!(
            responses.keys().copied().collect::<Vec<_>>(),
            TravelMode::ALL.to_vec()
        );
    }
}
