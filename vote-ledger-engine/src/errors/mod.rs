//! Error types for the vote ledger engine.
//! Defines the errors surfaced by voting operations and by configuration loading.
mod config;
mod voting;

pub use config::ConfigError;
pub use voting::VotingError;
