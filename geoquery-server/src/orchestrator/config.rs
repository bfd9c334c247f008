//! Orchestrator configuration.

use std::time::Duration;

use super::chunk::PROVIDER_MAX_DESTINATIONS;
use super::retry::RetryPolicy;

/// Tuning for batch orchestration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Destinations per distance matrix request. Clamped to the provider limit.
    pub chunk_size: usize,

    /// Retry policy for quota-exhausted responses.
    pub retry: RetryPolicy,

    /// Wait before a `next_page_token` may be used.
    pub page_token_delay: Duration,

    /// Upper bound on pages followed for one search term.
    pub max_pages_per_term: usize,
}

impl OrchestratorConfig {
    /// Chunk size actually used, within `1..=25`.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.clamp(1, PROVIDER_MAX_DESTINATIONS)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            chunk_size: PROVIDER_MAX_DESTINATIONS,
            retry: RetryPolicy::default(),
            page_token_delay: Duration::from_secs(2),
            max_pages_per_term: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OrchestratorConfig::default();

        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.page_token_delay, Duration::from_secs(2));
        assert_eq!(config.max_pages_per_term, 10);
    }

    #[test]
    fn chunk_size_is_clamped() {
        let mut config = OrchestratorConfig::default();
        config.chunk_size = 100;
        assert_eq!(config.effective_chunk_size(), 25);
        config.chunk_size = 0;
        assert_eq!(config.effective_chunk_size(), 1);
        config.chunk_size = 10;
        assert_eq!(config.effective_chunk_size(), 10);
    }
}
