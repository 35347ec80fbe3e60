//! Entity resolution.
//!
//! Voters and voteables are addressed by [`EntityRef`]. Host types implement
//! [`Voter`] or [`Voteable`] to produce their reference. A voteable may be a
//! presentation wrapper around the real entity; [`resolve`] unwraps it so
//! that a wrapper and the entity it wraps always share one identity.
use vote_ledger_shared::types::EntityRef;

use crate::errors::VotingError;

/// An entity that casts votes.
pub trait Voter: Send + Sync {
    fn voter_ref(&self) -> EntityRef;
}

/// An entity that receives votes.
pub trait Voteable: Send + Sync {
    fn voteable_ref(&self) -> EntityRef;

    /// Whether this voteable type keeps a cached point total that must be
    /// re-derived after every cast or clear.
    fn caches_point_total(&self) -> bool {
        false
    }

    /// Whether this value wraps another voteable.
    fn is_wrapped(&self) -> bool {
        false
    }

    /// The wrapped voteable. Only consulted when `is_wrapped` returns true.
    fn unwrap_entity(&self) -> Option<&dyn Voteable> {
        None
    }
}

impl Voter for EntityRef {
    fn voter_ref(&self) -> EntityRef {
        self.clone()
    }
}

impl Voteable for EntityRef {
    fn voteable_ref(&self) -> EntityRef {
        self.clone()
    }
}

/// The identity a voteable resolves to, with its cached-counter capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoteable {
    pub entity: EntityRef,
    pub caches_point_total: bool,
}

impl ResolvedVoteable {
    /// The voteable whose counter must be refreshed, if it keeps one.
    pub fn counter_target(&self) -> Option<&EntityRef> {
        self.caches_point_total.then_some(&self.entity)
    }
}

/// Wrapper layers followed before resolution gives up.
pub const MAX_UNWRAP_DEPTH: usize = 32;

/// Unwraps `voteable` down to the underlying entity.
///
/// Resolving an already unwrapped voteable returns its own identity, so
/// resolution is idempotent.
///
/// # Errors
///
/// Returns `VotingError::EntityNotFound` if a wrapper reports that it wraps
/// an entity but cannot produce it, or if more than [`MAX_UNWRAP_DEPTH`]
/// wrappers are stacked, which is how a wrapper cycle shows up.
pub fn resolve(voteable: &dyn Voteable) -> Result<ResolvedVoteable, VotingError> {
    let mut current = voteable;
    let mut depth = 0;
    while current.is_wrapped() {
        if depth == MAX_UNWRAP_DEPTH {
            return Err(VotingError::EntityNotFound(voteable.voteable_ref()));
        }
        current = current
            .unwrap_entity()
            .ok_or_else(|| VotingError::EntityNotFound(current.voteable_ref()))?;
        depth += 1;
    }

    Ok(ResolvedVoteable {
        entity: current.voteable_ref(),
        caches_point_total: current.caches_point_total(),
    })
}
