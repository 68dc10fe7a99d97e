// Error taxonomy shared by every data source adapter
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    Unauthorized,
    Network,
    Malformed,
    Timeout,
    Upstream,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out after {0}ms")]
    Timeout(u64),
    #[error("upstream returned status {status}")]
    Upstream { status: u16 },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NotFound(_) => ErrorKind::NotFound,
            FetchError::RateLimited(_) => ErrorKind::RateLimited,
            FetchError::Unauthorized(_) => ErrorKind::Unauthorized,
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Malformed(_) => ErrorKind::Malformed,
            FetchError::Timeout(_) => ErrorKind::Timeout,
            FetchError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    /// Map a non-2xx HTTP status onto the taxonomy.
    pub fn from_status(status: u16, context: &str) -> Self {
        match status {
            404 => FetchError::NotFound(context.to_string()),
            401 | 403 => FetchError::Unauthorized(context.to_string()),
            429 => FetchError::RateLimited(context.to_string()),
            _ => FetchError::Upstream { status },
        }
    }
}
