//! Error types for the vote repository.
//! Defines the errors that can occur while reading or mutating the vote ledger.
use thiserror::Error;
use vote_ledger_shared::types::{EntityRef, VoteId};

/// Represents errors that can occur within the vote repository.
///
/// Connectivity problems are classified into `StoreUnavailable` and
/// `StoreTimeout` so callers can tell them apart from business rule
/// violations such as `DuplicateVote`.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Duplicate vote: {voter} has already voted on {voteable}")]
    DuplicateVote { voter: EntityRef, voteable: EntityRef },

    #[error("Vote not found: {0}")]
    VoteNotFound(VoteId),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store timeout: {0}")]
    StoreTimeout(String),

    #[error("Invalid vote direction: {0}")]
    InvalidDirection(i16),

    #[error("Inconsistent changeset: {0}")]
    InconsistentChangeset(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl VoteRepositoryError {
    /// Create a duplicate vote error for a voter and voteable.
    pub fn duplicate_vote(voter: &EntityRef, voteable: &EntityRef) -> Self {
        Self::DuplicateVote {
            voter: voter.clone(),
            voteable: voteable.clone(),
        }
    }

    /// Returns true for errors caused by the store being slow or unreachable.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreTimeout(_))
    }
}

impl From<sqlx::Error> for VoteRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => Self::StoreTimeout(error.to_string()),
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                Self::StoreUnavailable(error.to_string())
            }
            other => Self::DatabaseError(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_store_timeout() {
        let error = VoteRepositoryError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, VoteRepositoryError::StoreTimeout(_)));
        assert!(error.is_transient());
    }

    #[test]
    fn test_closed_pool_is_store_unavailable() {
        let error = VoteRepositoryError::from(sqlx::Error::PoolClosed);
        assert!(matches!(error, VoteRepositoryError::StoreUnavailable(_)));
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let error = VoteRepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, VoteRepositoryError::DatabaseError(_)));
        assert!(!error.is_transient());
    }

    #[test]
    fn test_duplicate_vote_message() {
        let error = VoteRepositoryError::duplicate_vote(
            &EntityRef::new("User", 1),
            &EntityRef::new("Item", 2),
        );
        assert_eq!(
            error.to_string(),
            "Duplicate vote: User#1 has already voted on Item#2"
        );
    }
}
