//! This module defines and re-exports the interfaces for the vote repository.
//! It serves as a central point for accessing traits related to ledger storage.
mod vote_repository;

pub use vote_repository::{DerivedField, VoteRepository, group_points_in_first_vote_order};
