use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Direction, EntityRef};

/// Store-assigned vote identifier. Increases with insertion order.
pub type VoteId = i64;

/// A `(voter, voteable)` pair. The uniqueness invariant is keyed on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotePair {
    pub voter: EntityRef,
    pub voteable: EntityRef,
}

impl VotePair {
    pub fn new(voter: EntityRef, voteable: EntityRef) -> Self {
        Self { voter, voteable }
    }
}

/// A vote that has not been persisted yet.
///
/// `points` already carries the sign implied by `direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    pub pair: VotePair,
    pub direction: Direction,
    pub points: i64,
}

impl NewVote {
    /// Builds a vote from an unsigned point magnitude, signing it by direction.
    pub fn new(voter: EntityRef, voteable: EntityRef, direction: Direction, magnitude: u32) -> Self {
        Self {
            pair: VotePair::new(voter, voteable),
            direction,
            points: direction.signed_points(magnitude),
        }
    }
}

/// A vote recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub voter: EntityRef,
    pub voteable: EntityRef,
    pub direction: Direction,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    /// Returns true if this vote was cast by `pair.voter` on `pair.voteable`.
    pub fn belongs_to(&self, pair: &VotePair) -> bool {
        self.voter == pair.voter && self.voteable == pair.voteable
    }
}
