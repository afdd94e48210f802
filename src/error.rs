use thiserror::Error;

/// Failure of a single request, as seen by the engine and its observers.
///
/// `Clone` so that one page failure can be handed to every error observer.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connectivity or timeout failure from the underlying network stack.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP status outside the descriptor's acceptable range.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The response carried no body where one was required.
    #[error("empty response body")]
    EmptyBody,

    /// The service answered but reported an application failure.
    #[error("catalog API error ({code}): {message}")]
    Api {
        stat: String,
        code: i64,
        message: String,
    },

    /// The payload did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Programming or test-setup defect (unregistered mock, type mismatch).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    /// Machine-readable API code, if the service supplied one.
    pub fn code(&self) -> Option<i64> {
        match self {
            FetchError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, FetchError::Configuration(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
