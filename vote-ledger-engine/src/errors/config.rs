//! Error types for configuration loading.
use thiserror::Error;
use vote_ledger_repository::VoteRepositoryError;

/// Represents errors that can occur while loading settings or wiring the
/// ledger store.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVariable(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidVariable { name: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
}
