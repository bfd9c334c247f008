//! Server configuration from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::google::GoogleConfig;

pub const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 370;
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Longest accepted cache TTL: the cache refuses anything over 1000 years.
pub const MAX_CACHE_TTL_HOURS: u64 = 1000 * 365 * 24;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not valid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything `main` needs to start serving.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Provider client settings. The API key is empty when unset; provider
    /// calls will then fail.
    pub google: GoogleConfig,

    pub bind_addr: SocketAddr,

    /// Serve canned responses from this directory instead of calling Google.
    pub mock_data_dir: Option<PathBuf>,

    /// Deadline for one inbound request, orchestration included.
    pub request_timeout: Duration,

    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_var("BIND_ADDR", get("BIND_ADDR"))?
            .unwrap_or(SocketAddr::from(DEFAULT_BIND_ADDR));
        let request_timeout = parse_var("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let ttl_hours = parse_var("CACHE_TTL_HOURS", get("CACHE_TTL_HOURS"))?
            .unwrap_or(DEFAULT_CACHE_TTL_HOURS);
        let max_capacity = parse_var("CACHE_MAX_ENTRIES", get("CACHE_MAX_ENTRIES"))?
            .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);

        let ttl = ttl_hours
            .checked_mul(60 * 60)
            .filter(|_| ttl_hours <= MAX_CACHE_TTL_HOURS)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::Invalid {
                var: "CACHE_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: format!("must be at most {MAX_CACHE_TTL_HOURS} hours"),
            })?;

        let mut google = GoogleConfig::new(get("GOOGLE_API_KEY").unwrap_or_default());
        if let Some(url) = get("GOOGLE_BASE_URL") {
            google = google.with_base_url(url.trim());
        }
        if let Some(n) = parse_var::<usize>("GOOGLE_MAX_CONCURRENT", get("GOOGLE_MAX_CONCURRENT"))? {
            if n == 0 {
                return Err(ConfigError::Invalid {
                    var: "GOOGLE_MAX_CONCURRENT",
                    value: n.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            google = google.with_max_concurrent(n);
        }
        if let Some(secs) = parse_var("GOOGLE_TIMEOUT_SECS", get("GOOGLE_TIMEOUT_SECS"))? {
            google = google.with_timeout(secs);
        }

        Ok(Self {
            google,
            bind_addr,
            mock_data_dir: get("MOCK_DATA_DIR").map(PathBuf::from),
            request_timeout: Duration::from_secs(request_timeout),
            cache: CacheConfig { ttl, max_capacity },
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
