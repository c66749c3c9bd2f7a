use thiserror::Error;

/// Rejected input at the registration boundary. Never persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("check interval too short: {seconds}s (minimum {minimum}s)")]
    IntervalTooShort { seconds: u64, minimum: u64 },
}

/// Fault raised by the persistence layer or the validation it performs.
///
/// The cycle orchestrator logs these and continues with the next service;
/// they are never shown to service owners.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool::managed::PoolError<libsql::Error>),
}
