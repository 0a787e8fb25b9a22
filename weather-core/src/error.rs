//! Error types shared across the core crate.
//!
//! Each layer has its own enum: the provider reports transport/status/decode
//! failures, the stores report database faults (with unique-constraint
//! violations split out), and the services translate both into outcomes the
//! HTTP layer can map onto status codes.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the upstream weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to weather provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("weather provider returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("stored value is invalid: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return Self::UniqueViolation(db.message().to_string());
        }
        Self::Database(err)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
