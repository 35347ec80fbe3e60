use crate::types::{EntityRef, NewVote, Vote, VotePair};

/// A group of ledger mutations to be applied atomically.
///
/// Steps run in field order: votes matching `clear` are deleted, `insert` is
/// recorded, then the cached point total of `refresh_counter` is recomputed
/// from the resulting ledger state.
#[derive(Debug, Default)]
pub struct Changeset<'a> {
    pub clear: Option<&'a VotePair>,
    pub insert: Option<&'a NewVote>,
    pub refresh_counter: Option<&'a EntityRef>,
}

impl Changeset<'_> {
    pub fn is_empty(&self) -> bool {
        self.clear.is_none() && self.insert.is_none() && self.refresh_counter.is_none()
    }
}

/// What a persisted changeset did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangesetOutcome {
    /// Number of votes deleted by the `clear` step.
    pub removed: u64,
    /// The vote recorded by the `insert` step.
    pub inserted: Option<Vote>,
    /// The cached point total written by the `refresh_counter` step.
    pub counter: Option<i64>,
}
