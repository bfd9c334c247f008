//! Provider boundary error types.

/// Errors from issuing a request to the maps provider.
#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    /// HTTP request failed (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No response was received from a non-HTTP transport
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The request could not be built; nothing was sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key
    #[error("unauthorized: check GOOGLE_API_KEY")]
    Unauthorized,

    /// Fixture directory could not be loaded
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl MapsError {
    /// Whether the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, MapsError::Http(_) | MapsError::Transport(_))
    }
}
