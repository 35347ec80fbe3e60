//! This module defines the `VoteRepository` trait, the store contract of the
//! vote ledger. It abstracts inserts, deletes, filtered reads and aggregate
//! reads over `Vote` records, plus the derived-field writes used for cached
//! point counters.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use vote_ledger_shared::types::{
    Changeset, ChangesetOutcome, EntityRef, NewVote, TallyEntry, Vote, VoteId, VotePair,
    VoteQuery,
};

use crate::errors::VoteRepositoryError;

/// Denormalized per-voteable values that are written outside of the owning
/// entity's normal validation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DerivedField {
    /// Net points of every vote on the voteable.
    CachedPointTotal,
}

impl DerivedField {
    pub fn column(self) -> &'static str {
        match self {
            DerivedField::CachedPointTotal => "cached_point_total",
        }
    }
}

/// A trait that defines the interface for interacting with the vote ledger.
///
/// Implementors must enforce the uniqueness invariant atomically at insert
/// time and must give every read a consistent point-in-time view. Every
/// method is a potential suspension point.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Records a new vote.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The stored vote with its id and timestamps
    /// * `Err(VoteRepositoryError::DuplicateVote)` - The pair already has a vote and uniqueness is enforced
    async fn insert_vote(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError>;

    /// Deletes every vote cast by `pair.voter` on `pair.voteable`.
    ///
    /// Deleting nothing is not an error.
    ///
    /// # Returns
    ///
    /// The number of votes removed.
    async fn delete_matching(&self, pair: &VotePair) -> Result<u64, VoteRepositoryError>;

    /// Returns the votes matching `query`, oldest first (by `created_at`, then id).
    async fn query_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, VoteRepositoryError>;

    /// Counts the votes matching `query`.
    async fn count_votes(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError>;

    /// Sums the signed points of the votes matching `query`. Empty selections sum to zero.
    async fn sum_points(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError>;

    /// Groups the votes matching `query` by voteable and sums their points.
    ///
    /// Groups are ordered by their earliest `created_at`, then by their
    /// smallest vote id. Voteables without a matching vote do not appear.
    async fn group_points(&self, query: &VoteQuery) -> Result<Vec<TallyEntry>, VoteRepositoryError> {
        let votes = self.query_votes(query).await?;
        Ok(group_points_in_first_vote_order(&votes))
    }

    /// Writes a derived value for `voteable`, bypassing entity validation.
    async fn write_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
        value: i64,
    ) -> Result<(), VoteRepositoryError>;

    /// Reads a derived value for `voteable`. `None` if it was never written.
    async fn read_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
    ) -> Result<Option<i64>, VoteRepositoryError>;

    /// Lists the derived values written for voteables of `kind`, ordered by voteable id.
    async fn list_derived_field(
        &self,
        kind: &str,
        field: DerivedField,
    ) -> Result<Vec<TallyEntry>, VoteRepositoryError>;

    /// Atomically applies a `Changeset`.
    ///
    /// Either every step succeeds or none is visible. A `DuplicateVote` on the
    /// insert step rolls back the clear step.
    async fn persist_changeset(
        &self,
        changeset: &Changeset<'_>,
    ) -> Result<ChangesetOutcome, VoteRepositoryError>;

    /// Rewrites the timestamps of one vote. Administrative use only.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The vote with its new timestamps
    /// * `Err(VoteRepositoryError::VoteNotFound)` - No vote has this id
    async fn adjust_timestamps(
        &self,
        vote_id: VoteId,
        created_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError>;

    /// Deletes every vote cast by `voter` and refreshes the existing cached
    /// point totals of the voteables it had voted on.
    ///
    /// # Returns
    ///
    /// The number of votes removed.
    async fn delete_votes_by_voter(&self, voter: &EntityRef) -> Result<u64, VoteRepositoryError>;
}

/// Groups votes per voteable in the order documented on
/// [`VoteRepository::group_points`].
pub fn group_points_in_first_vote_order(votes: &[Vote]) -> Vec<TallyEntry> {
    // (points, earliest created_at, smallest id) per voteable
    let mut groups: HashMap<&EntityRef, (i64, DateTime<Utc>, VoteId)> = HashMap::new();
    for vote in votes {
        groups
            .entry(&vote.voteable)
            .and_modify(|(points, first_at, first_id)| {
                *points += vote.points;
                *first_at = (*first_at).min(vote.created_at);
                *first_id = (*first_id).min(vote.id);
            })
            .or_insert((vote.points, vote.created_at, vote.id));
    }

    let mut grouped: Vec<_> = groups.into_iter().collect();
    grouped.sort_by_key(|(_, (_, first_at, first_id))| (*first_at, *first_id));
    grouped
        .into_iter()
        .map(|(voteable, (points, _, _))| TallyEntry {
            voteable: voteable.clone(),
            points,
        })
        .collect()
}
