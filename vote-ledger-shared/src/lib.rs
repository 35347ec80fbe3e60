//! # Vote Ledger Shared
//! This crate defines the data structures shared across the vote ledger crates.
//! It includes entity references, votes and their directions, query filters,
//! time windows, tally results and changesets.
pub mod types;
