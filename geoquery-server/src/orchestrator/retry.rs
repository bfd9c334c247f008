//! Retrying request executor.
//!
//! Issues one provider request and retries it while the provider answers
//! `OVER_QUERY_LIMIT`. Backoff grows linearly: a call made with `r` attempts
//! remaining waits `base_delay * (max_attempts - r)` before the next one, so
//! the first retry is immediate. Transport failures are returned at once.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::google::{MapsError, MapsRequest, MapsResponse, MapsTransport};

use super::error::QueryError;

/// How often and how patiently to retry quota-exhausted calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first.
    pub max_attempts: u32,
    /// Unit of the linear backoff.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Retry without waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay after a quota response to a call made with `attempts_remaining` left.
    pub fn backoff(&self, attempts_remaining: u32) -> Duration {
        self.base_delay * self.max_attempts.saturating_sub(attempts_remaining)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Per-invocation retry bookkeeping. Never shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryState {
    attempts_remaining: u32,
    next_delay: Duration,
}

impl RetryState {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts_remaining: policy.max_attempts,
            next_delay: Duration::ZERO,
        }
    }

    /// Record a quota response. Returns the wait before the next attempt,
    /// or `None` once no attempts remain.
    fn record_quota(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        self.next_delay = policy.backoff(self.attempts_remaining);
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        (self.attempts_remaining > 0).then_some(self.next_delay)
    }
}

/// Result of an executor run that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The provider answered with something other than a quota error.
    Completed(MapsResponse),
    /// Every attempt was rate limited.
    Exhausted { attempts: u32 },
}

impl Outcome {
    /// The response, or `None` for an exhausted run.
    pub fn into_response(self) -> Option<MapsResponse> {
        match self {
            Outcome::Completed(response) => Some(response),
            Outcome::Exhausted { .. } => None,
        }
    }

    /// The response, treating exhaustion as an error.
    pub fn require(self) -> Result<MapsResponse, QueryError> {
        match self {
            Outcome::Completed(response) => Ok(response),
            Outcome::Exhausted { attempts } => Err(QueryError::QuotaExhausted { attempts }),
        }
    }
}

/// Sends requests through a transport under a [`RetryPolicy`].
///
/// Cheap to clone; clones share the transport. Each `execute` call keeps its
/// own retry state, so concurrent calls do not interfere.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn MapsTransport>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn MapsTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Issue `request`, retrying quota-exhausted responses.
    ///
    /// Returns `Ok(Outcome::Exhausted)` rather than an error when the
    /// attempts run out; callers decide whether that is fatal.
    pub async fn execute(&self, request: &MapsRequest) -> Result<Outcome, MapsError> {
        let mut state = RetryState::new(&self.policy);
        let mode = request.param("mode").unwrap_or("-");

        while state.attempts_remaining > 0 {
            let response = self.transport.send(request).await?;
            if !response.status.is_quota_exhausted() {
                return Ok(Outcome::Completed(response));
            }

            let Some(delay) = state.record_quota(&self.policy) else {
                break;
            };
            warn!(
                endpoint = request.endpoint.name(),
                mode,
                attempts_remaining = state.attempts_remaining,
                delay_ms = delay.as_millis() as u64,
                "rate limit exceeded, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        warn!(
            endpoint = request.endpoint.name(),
            mode,
            attempts = self.policy.max_attempts,
            "out of retries"
        );
        debug!(?request, "request abandoned");
        Ok(Outcome::Exhausted {
            attempts: self.policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::google::mock::ScriptedTransport;
    use crate::google::{ApiStatus, Endpoint};

    fn quota_then_ok(failures: usize) -> Arc<ScriptedTransport> {
        let calls = AtomicUsize::new(0);
        Arc::new(ScriptedTransport::new(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                Ok(MapsResponse::with_status(ApiStatus::OverQueryLimit))
            } else {
                Ok(MapsResponse::from_body(json!({ "status": "OK", "n": n })))
            }
        }))
    }

    fn request() -> MapsRequest {
        MapsRequest::new(Endpoint::DistanceMatrix).with_param("mode", "driving")
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(5), Duration::ZERO);
        assert_eq!(policy.backoff(4), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(3));
        assert_eq!(policy.backoff(0), Duration::from_secs(5));
        assert_eq!(policy.backoff(9), Duration::ZERO);
    }

    #[test]
    fn retry_state_counts_down_to_zero() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let mut state = RetryState::new(&policy);

        assert_eq!(state.record_quota(&policy), Some(Duration::ZERO));
        assert_eq!(state.record_quota(&policy), Some(Duration::from_millis(100)));
        assert_eq!(state.record_quota(&policy), None);
        assert_eq!(state.attempts_remaining, 0);
        assert_eq!(state.record_quota(&policy), None);
        assert_eq!(state.attempts_remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_last_attempt_after_linear_backoff() {
        let transport = quota_then_ok(4);
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = executor.execute(&request()).await.unwrap();

        let response = outcome.into_response().unwrap();
        assert_eq!(response.body["n"], 4);
        assert_eq!(transport.request_count(), 5);
        // 0s + 1s + 2s + 3s
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_is_reported_not_raised() {
        let transport = quota_then_ok(usize::MAX);
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = executor.execute(&request()).await.unwrap();

        assert_eq!(outcome, Outcome::Exhausted { attempts: 5 });
        assert_eq!(transport.request_count(), 5);
        // No wait after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert!(matches!(
            outcome.require(),
            Err(QueryError::QuotaExhausted { attempts: 5 })
        ));
    }

    #[tokio::test]
    async fn non_quota_status_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::always(json!({ "status": "ZERO_RESULTS" })));
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::default());

        let outcome = executor.execute(&request()).await.unwrap();

        let response = outcome.require().unwrap();
        assert_eq!(response.status, ApiStatus::ZeroResults);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Err(MapsError::Transport("connection refused".into()))
        }));
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::immediate(5));

        let err = executor.execute(&request()).await.unwrap_err();

        assert!(err.is_network());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn zero_attempts_sends_nothing() {
        let transport = quota_then_ok(0);
        let executor = RequestExecutor::new(transport.clone(), RetryPolicy::immediate(0));

        let outcome = executor.execute(&request()).await.unwrap();

        assert_eq!(outcome, Outcome::Exhausted { attempts: 0 });
        assert_eq!(transport.request_count(), 0);
    }
}
