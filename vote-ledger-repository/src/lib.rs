//! # Vote Ledger Repository
//! This crate provides the store contract of the vote ledger together with an
//! in-memory implementation and a PostgreSQL implementation. It includes
//! definitions for errors, configuration, interfaces and both backends.
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use config::LedgerConfig;
pub use errors::VoteRepositoryError;
pub use interfaces::{DerivedField, VoteRepository};
pub use memory::InMemoryVoteRepository;
pub use postgres::PostgresVoteRepository;
