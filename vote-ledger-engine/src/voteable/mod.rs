//! Per-voteable aggregation.
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use vote_ledger_repository::{DerivedField, VoteRepository};
use vote_ledger_shared::types::{
    Direction, EntityRef, Vote, VoteFilter, VotePair, VoteQuery,
};

use crate::errors::VotingError;
use crate::resolution::{ResolvedVoteable, Voteable, Voter, resolve};

/// Turns voter references back into live host objects.
///
/// The engine only ever returns references; callers that need the voters
/// themselves supply a lookup.
#[async_trait]
pub trait EntityLookup<T>: Send + Sync {
    /// Returns `Ok(None)` when no entity has this reference.
    async fn find(&self, entity: &EntityRef) -> Result<Option<T>, VotingError>;
}

/// Counts and point sums of one voteable, read from a single snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteSummary {
    pub votes_for: i64,
    pub votes_against: i64,
    pub points_for: i64,
    /// Magnitude of the down-vote points, always non-negative.
    pub points_against: i64,
}

impl VoteSummary {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        votes.into_iter().fold(Self::default(), |mut summary, vote| {
            match vote.direction {
                Direction::Up => {
                    summary.votes_for += 1;
                    summary.points_for += vote.points;
                }
                Direction::Down => {
                    summary.votes_against += 1;
                    summary.points_against -= vote.points;
                }
            }
            summary
        })
    }

    pub fn votes_count(&self) -> i64 {
        self.votes_for + self.votes_against
    }

    pub fn points_count(&self) -> i64 {
        self.points_for - self.points_against
    }

    pub fn plusminus(&self) -> i64 {
        self.votes_for - self.votes_against
    }

    /// Share of up votes, rounded to the nearest whole percent.
    ///
    /// Rounded independently of [`percent_against`](Self::percent_against),
    /// so the two may not add up to 100.
    pub fn percent_for(&self) -> i64 {
        percent_of(self.votes_for, self.votes_count())
    }

    pub fn percent_against(&self) -> i64 {
        percent_of(self.votes_against, self.votes_count())
    }
}

fn percent_of(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as i64
}

/// Reads about the votes one voteable received.
///
/// The voteable is resolved once at construction, so a wrapper and the
/// entity it wraps produce identical results.
pub struct VoteableAggregator {
    repository: Arc<dyn VoteRepository>,
    target: ResolvedVoteable,
}

impl VoteableAggregator {
    /// # Errors
    ///
    /// `VotingError::EntityNotFound` if `voteable` is a wrapper without a
    /// source entity.
    pub fn new(
        repository: Arc<dyn VoteRepository>,
        voteable: &dyn Voteable,
    ) -> Result<Self, VotingError> {
        Ok(Self {
            repository,
            target: resolve(voteable)?,
        })
    }

    pub fn voteable(&self) -> &EntityRef {
        &self.target.entity
    }

    fn query(&self) -> VoteQuery {
        VoteQuery::on_voteable(&self.target.entity)
    }

    pub async fn votes_for(&self) -> Result<i64, VotingError> {
        let query = self.query().with_direction(Direction::Up);
        Ok(self.repository.count_votes(&query).await?)
    }

    pub async fn votes_against(&self) -> Result<i64, VotingError> {
        let query = self.query().with_direction(Direction::Down);
        Ok(self.repository.count_votes(&query).await?)
    }

    pub async fn votes_count(&self) -> Result<i64, VotingError> {
        Ok(self.repository.count_votes(&self.query()).await?)
    }

    pub async fn points_for(&self) -> Result<i64, VotingError> {
        let query = self.query().with_direction(Direction::Up);
        Ok(self.repository.sum_points(&query).await?)
    }

    /// Points of the down votes, reported as a positive number.
    pub async fn points_against(&self) -> Result<i64, VotingError> {
        let query = self.query().with_direction(Direction::Down);
        Ok(-self.repository.sum_points(&query).await?)
    }

    /// Net weighted score. Equal to the cached point total whenever the
    /// voteable keeps one.
    pub async fn points_count(&self) -> Result<i64, VotingError> {
        Ok(self.repository.sum_points(&self.query()).await?)
    }

    /// Up votes minus down votes, ignoring weights.
    pub async fn plusminus(&self) -> Result<i64, VotingError> {
        Ok(self.summary().await?.plusminus())
    }

    pub async fn percent_for(&self) -> Result<i64, VotingError> {
        Ok(self.summary().await?.percent_for())
    }

    pub async fn percent_against(&self) -> Result<i64, VotingError> {
        Ok(self.summary().await?.percent_against())
    }

    /// Every count and sum at once, derived from one read of the ledger.
    pub async fn summary(&self) -> Result<VoteSummary, VotingError> {
        let votes = self.repository.query_votes(&self.query()).await?;
        Ok(VoteSummary::from_votes(&votes))
    }

    /// Votes on this voteable, oldest first.
    pub async fn votes(&self, filter: VoteFilter) -> Result<Vec<Vote>, VotingError> {
        let query = self.query().with_filter(filter);
        Ok(self.repository.query_votes(&query).await?)
    }

    /// Distinct voters of this voteable, in the order of their first vote.
    pub async fn voters_who_voted(&self) -> Result<Vec<EntityRef>, VotingError> {
        let votes = self.repository.query_votes(&self.query()).await?;
        let mut seen = HashSet::new();
        Ok(votes
            .into_iter()
            .filter_map(|vote| seen.insert(vote.voter.clone()).then_some(vote.voter))
            .collect())
    }

    /// Like [`voters_who_voted`](Self::voters_who_voted), resolving every
    /// reference through `lookup`.
    ///
    /// # Errors
    ///
    /// `VotingError::EntityNotFound` if the lookup does not know a voter.
    pub async fn resolve_voters<T>(
        &self,
        lookup: &dyn EntityLookup<T>,
    ) -> Result<Vec<T>, VotingError> {
        let mut voters = Vec::new();
        for voter in self.voters_who_voted().await? {
            match lookup.find(&voter).await? {
                Some(found) => voters.push(found),
                None => return Err(VotingError::EntityNotFound(voter)),
            }
        }
        Ok(voters)
    }

    pub async fn voted_by(&self, voter: &dyn Voter) -> Result<bool, VotingError> {
        let pair = VotePair::new(voter.voter_ref(), self.target.entity.clone());
        Ok(self.repository.count_votes(&VoteQuery::for_pair(&pair)).await? > 0)
    }

    /// The stored counter, or `None` if this voteable keeps none.
    ///
    /// A caching voteable whose counter was never written reads as zero, the
    /// value its empty ledger sums to.
    pub async fn cached_point_total(&self) -> Result<Option<i64>, VotingError> {
        let Some(entity) = self.target.counter_target() else {
            return Ok(None);
        };
        let stored = self
            .repository
            .read_derived_field(entity, DerivedField::CachedPointTotal)
            .await?;
        Ok(Some(stored.unwrap_or(0)))
    }

    /// Re-derives the cached point total from the ledger and writes it.
    ///
    /// Casts and clears already do this inside their own changeset. This is
    /// for repairing counters that were written outside the engine.
    pub async fn sync_cached_counter(&self) -> Result<Option<i64>, VotingError> {
        let Some(entity) = self.target.counter_target() else {
            return Ok(None);
        };
        let total = self.points_count().await?;
        self.repository
            .write_derived_field(entity, DerivedField::CachedPointTotal, total)
            .await?;
        debug!(voteable = %entity, total, "Cached point total synced");
        Ok(Some(total))
    }
}
