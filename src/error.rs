//! Error kinds for the ranking engine and the project store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrendingError {
    #[error("unparseable created_at timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("unknown period {0:?} (expected today, week, month or all)")]
    UnknownPeriod(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project {0} not found")]
    NotFound(String),
    #[error("unknown project status {0:?}")]
    UnknownStatus(String),
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("reading seed file: {0}")]
    Io(#[from] std::io::Error),
}
