use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Space used by {user} would overflow when adding {delta}")]
    SpaceOverflow { user: String, delta: i64 },
}

pub type Result<T> = std::result::Result<T, QuotaError>;
