// Tagged outcome of one adapter invocation
use super::entity::Entity;
use super::error::FetchError;
use super::notice::Notice;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<E> {
    Pending,
    Success {
        data: Vec<E>,
        fetched_at: DateTime<Utc>,
        warning: Option<Notice>,
    },
    Failure(FetchError),
}

impl<E> Default for FetchResult<E> {
    fn default() -> Self {
        FetchResult::Pending
    }
}

impl<E> FetchResult<E> {
    pub fn success(data: Vec<E>) -> Self {
        FetchResult::Success {
            data,
            fetched_at: Utc::now(),
            warning: None,
        }
    }

    pub fn success_with(data: Vec<E>, warning: Option<Notice>) -> Self {
        FetchResult::Success {
            data,
            fetched_at: Utc::now(),
            warning,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchResult::Pending)
    }

    /// Entities of a successful result, empty otherwise.
    pub fn data(&self) -> &[E] {
        match self {
            FetchResult::Success { data, .. } => data,
            _ => &[],
        }
    }

    pub fn warning(&self) -> Option<&Notice> {
        match self {
            FetchResult::Success { warning, .. } => warning.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchResult::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_data(self) -> Vec<E> {
        match self {
            FetchResult::Success { data, .. } => data,
            _ => Vec::new(),
        }
    }
}

impl<E: Entity> FetchResult<E> {
    /// True when every entity is live; used to decide whether a retry is worthwhile.
    pub fn is_live(&self) -> bool {
        match self {
            FetchResult::Success { data, .. } => data.iter().all(|e| !e.is_synthetic()),
            _ => false,
        }
    }
}

impl<E> From<Result<Vec<E>, FetchError>> for FetchResult<E> {
    fn from(result: Result<Vec<E>, FetchError>) -> Self {
        match result {
            Ok(data) => FetchResult::success(data),
            Err(err) => FetchResult::Failure(err),
        }
    }
}
