use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapboxError>;

#[derive(Debug, Error)]
pub enum MapboxError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl MapboxError {
    /// Transport, timeout and non-2xx responses are worth retrying; a bad body or query is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MapboxError::Transport(_) | MapboxError::Api { .. })
    }
}

// The request URL carries the access token in its query string, so it is stripped
// before the error is rendered.
impl From<reqwest::Error> for MapboxError {
    fn from(err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        let err = err.without_url();
        if timed_out {
            MapboxError::Transport(format!("request timed out: {err}"))
        } else {
            MapboxError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MapboxError {
    fn from(err: serde_json::Error) -> Self {
        MapboxError::Decode(err.to_string())
    }
}
