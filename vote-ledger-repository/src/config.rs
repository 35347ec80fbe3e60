//! Configuration types for vote repositories.

/// Configuration applied when a vote repository is set up.
///
/// The store enforces these rules itself, so they are fixed for the lifetime
/// of a repository rather than passed per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Rejects a second vote by the same voter on the same voteable.
    ///
    /// Defaults to `true`. Exclusive casting and idempotent re-voting rely on it.
    pub enforce_uniqueness: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enforce_uniqueness: true,
        }
    }
}

impl LedgerConfig {
    /// Create a config that allows several votes per voter and voteable.
    ///
    /// # Returns
    ///
    /// A `LedgerConfig` with `enforce_uniqueness` set to `false`.
    pub fn allow_multiple_votes() -> Self {
        Self {
            enforce_uniqueness: false,
        }
    }
}
