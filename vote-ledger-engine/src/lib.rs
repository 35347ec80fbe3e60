//! # Vote Ledger Engine
//! This crate implements voting and score aggregation on top of a
//! `VoteRepository`. It includes entity resolution, the voter-side service,
//! the voteable-side aggregator, time-windowed tallies and configuration
//! loading, along with error handling.
pub mod config;
pub mod errors;
pub mod resolution;
pub mod tally;
pub mod voteable;
pub mod voter;

pub use errors::{ConfigError, VotingError};
pub use resolution::{MAX_UNWRAP_DEPTH, ResolvedVoteable, Voteable, Voter};
pub use tally::TallyEngine;
pub use voteable::{EntityLookup, VoteSummary, VoteableAggregator};
pub use voter::{CastOptions, VoterService};
