use serde::{Deserialize, Serialize};

use crate::types::{EntityRef, TimeWindow, VoteQuery};

/// Net points collected by one voteable inside a tally window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub voteable: EntityRef,
    pub points: i64,
}

/// Parameters of a tally or rank tally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyQuery {
    pub window: TimeWindow,
    /// Restricts the tally to voteables of one kind.
    pub voteable_kind: Option<String>,
    /// Maximum number of results, applied after ordering.
    pub limit: Option<usize>,
}

impl TallyQuery {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn for_kind(mut self, kind: impl Into<String>) -> Self {
        self.voteable_kind = Some(kind.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The ledger selection this tally groups over.
    pub fn vote_query(&self) -> VoteQuery {
        VoteQuery::all()
            .of_kind(self.voteable_kind.as_deref())
            .within(self.window)
    }
}
