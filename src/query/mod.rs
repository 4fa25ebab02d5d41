//! Data-fetch layer used by the pages.
//!
//! Every endpoint is bound to a cache key, a staleness window and the shared
//! [`RetryPolicy`]. Pages ask [`Queries`] for data and receive a
//! [`QueryState`] they can render directly.

mod cache;
mod hooks;
mod retry;

pub use cache::QueryCache;
pub use hooks::{with_budget, AggregateStatus, HighTierLeagues, Queries, MIN_PUUID_LEN};
pub use retry::{run_with_retry, RetryPolicy};

use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The entity does not exist
    NotFound,
    /// Request budget exceeded upstream
    RateLimited,
    /// Network or server failure; retried
    Transient,
    /// The API answered with something we cannot use
    InvalidResponse,
}

/// Settled failure of a query. Cloned to every caller waiting on the key.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct QueryError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, status, message)
    }

    /// The fetch task ended without publishing a result.
    pub fn aborted(query: &str) -> Self {
        Self::transient(None, format!("{} request aborted", query))
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }
}

impl From<FetchError> for QueryError {
    fn from(e: FetchError) -> Self {
        let status = e.status();
        let kind = match &e {
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::RateLimited { .. } => ErrorKind::RateLimited,
            FetchError::Json(_) | FetchError::Schema(_) | FetchError::InvalidUrl(_) => {
                ErrorKind::InvalidResponse
            }
            FetchError::Http(_) | FetchError::HttpStatus { .. } => match status {
                Some(404) => ErrorKind::NotFound,
                Some(429) => ErrorKind::RateLimited,
                _ => ErrorKind::Transient,
            },
        };
        Self::new(kind, status, e.to_string())
    }
}

/// What a page knows about one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<V> {
    /// Not requested: a required parameter is missing
    Idle,
    Loading,
    Success(V),
    Error(QueryError),
}

impl<V> QueryState<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            QueryState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> QueryState<U> {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(v) => QueryState::Success(f(v)),
            QueryState::Error(e) => QueryState::Error(e),
        }
    }
}

impl<V> From<Result<V, QueryError>> for QueryState<V> {
    fn from(result: Result<V, QueryError>) -> Self {
        match result {
            Ok(v) => QueryState::Success(v),
            Err(e) => QueryState::Error(e),
        }
    }
}
