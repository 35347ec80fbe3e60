//! Time-windowed tallies and leaderboards across voteables.
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::debug;
use vote_ledger_repository::{DerivedField, VoteRepository};
use vote_ledger_shared::types::{EntityRef, TallyEntry, TallyQuery};

use crate::errors::VotingError;

/// Groups and ranks votes across many voteables.
///
/// Tallies are returned in first-vote order: a voteable appears at the
/// position of its earliest in-window vote, ties broken by the smaller vote
/// id. Rankings sort that order stably by points, so voteables with equal
/// scores keep their first-vote order on every call.
pub struct TallyEngine {
    repository: Arc<dyn VoteRepository>,
}

impl TallyEngine {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self { repository }
    }

    /// Net points per voteable for the votes inside `query.window`.
    ///
    /// Voteables without an in-window vote are left out rather than reported
    /// with zero points.
    pub async fn tally(&self, query: &TallyQuery) -> Result<Vec<TallyEntry>, VotingError> {
        let mut entries = self.repository.group_points(&query.vote_query()).await?;
        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }

        debug!(
            kind = query.voteable_kind.as_deref().unwrap_or("*"),
            entries = entries.len(),
            "Tally computed"
        );
        Ok(entries)
    }

    /// The voteables of [`tally`](Self::tally), highest net score first, or
    /// lowest first when `ascending`.
    ///
    /// The limit applies after ordering.
    pub async fn rank_tally(
        &self,
        query: &TallyQuery,
        ascending: bool,
    ) -> Result<Vec<EntityRef>, VotingError> {
        let entries = self.repository.group_points(&query.vote_query()).await?;
        Ok(rank(entries, ascending, query.limit))
    }

    /// All-time leaderboard of one voteable kind, read from the cached point
    /// totals instead of the ledger.
    ///
    /// Only voteables whose counter has been written take part. Ties keep the
    /// order of voteable ids.
    pub async fn rank_by_cached_total(
        &self,
        kind: &str,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<EntityRef>, VotingError> {
        let entries = self
            .repository
            .list_derived_field(kind, DerivedField::CachedPointTotal)
            .await?;
        Ok(rank(entries, ascending, limit))
    }
}

fn rank(mut entries: Vec<TallyEntry>, ascending: bool, limit: Option<usize>) -> Vec<EntityRef> {
    if ascending {
        entries.sort_by_key(|entry| entry.points);
    } else {
        entries.sort_by_key(|entry| Reverse(entry.points));
    }

    entries
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|entry| entry.voteable)
        .collect()
}
