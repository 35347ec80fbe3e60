//! Error types for voting operations.
use thiserror::Error;
use vote_ledger_repository::VoteRepositoryError;
use vote_ledger_shared::types::{EntityRef, ParseDirectionError};

/// Represents errors returned by the voter service, the voteable aggregator
/// and the tally engine.
///
/// Store failures keep their classification: a `DuplicateVote`,
/// `StoreUnavailable` or `StoreTimeout` raised by the repository is returned
/// as the variant of the same name. Nothing is retried.
#[derive(Debug, Error)]
pub enum VotingError {
    /// Rejected at the API boundary before the store was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The voter already has a vote on this voteable.
    #[error("Duplicate vote: {voter} has already voted on {voteable}")]
    DuplicateVote { voter: EntityRef, voteable: EntityRef },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store timeout: {0}")]
    StoreTimeout(String),

    /// A voter or voteable reference could not be resolved.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityRef),

    #[error("Repository error: {0}")]
    Repository(VoteRepositoryError),
}

impl From<VoteRepositoryError> for VotingError {
    fn from(error: VoteRepositoryError) -> Self {
        match error {
            VoteRepositoryError::DuplicateVote { voter, voteable } => {
                Self::DuplicateVote { voter, voteable }
            }
            VoteRepositoryError::StoreUnavailable(message) => Self::StoreUnavailable(message),
            VoteRepositoryError::StoreTimeout(message) => Self::StoreTimeout(message),
            other => Self::Repository(other),
        }
    }
}

impl From<ParseDirectionError> for VotingError {
    fn from(error: ParseDirectionError) -> Self {
        Self::InvalidArgument(error.to_string())
    }
}

impl VotingError {
    /// Returns true if the error is the expected outcome of re-voting without
    /// clearing first.
    pub fn is_duplicate_vote(&self) -> bool {
        matches!(self, Self::DuplicateVote { .. })
    }
}
