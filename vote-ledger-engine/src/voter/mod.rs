//! Voter-side operations.
//!
//! A host type that votes holds a [`VoterService`] bound to its own
//! [`EntityRef`] and forwards to it.
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use vote_ledger_repository::{VoteRepository, VoteRepositoryError};
use vote_ledger_shared::types::{
    Changeset, Direction, EntityRef, NewVote, Vote, VoteFilter, VotePair, VoteQuery,
};

use crate::errors::VotingError;
use crate::resolution::{Voteable, Voter, resolve};

/// Point magnitude used when the caller does not weight a vote.
pub const DEFAULT_POINTS: u32 = 1;

/// Options of a generic cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOptions {
    /// Unsigned point magnitude. The sign comes from the direction.
    pub points: u32,
    /// Clear the voter's previous votes on the voteable first.
    pub exclusive: bool,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            exclusive: false,
        }
    }
}

impl CastOptions {
    pub fn weighted(points: u32) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

/// Operations performed by one voter.
pub struct VoterService {
    repository: Arc<dyn VoteRepository>,
    voter: EntityRef,
}

impl VoterService {
    /// Creates a service acting as `voter`.
    pub fn new(repository: Arc<dyn VoteRepository>, voter: EntityRef) -> Self {
        Self { repository, voter }
    }

    /// Creates a service acting as the given host entity.
    pub fn for_voter(repository: Arc<dyn VoteRepository>, voter: &dyn Voter) -> Self {
        Self::new(repository, voter.voter_ref())
    }

    pub fn voter(&self) -> &EntityRef {
        &self.voter
    }

    /// Casts an up vote worth `points`.
    ///
    /// # Errors
    ///
    /// `VotingError::DuplicateVote` if this voter already voted on `voteable`.
    pub async fn cast_up(&self, voteable: &dyn Voteable, points: u32) -> Result<Vote, VotingError> {
        self.cast_direction(voteable, Direction::Up, CastOptions::weighted(points))
            .await
    }

    /// Casts a down vote worth `points`.
    ///
    /// # Errors
    ///
    /// `VotingError::DuplicateVote` if this voter already voted on `voteable`.
    pub async fn cast_down(&self, voteable: &dyn Voteable, points: u32) -> Result<Vote, VotingError> {
        self.cast_direction(voteable, Direction::Down, CastOptions::weighted(points))
            .await
    }

    /// Replaces any vote on `voteable` with an up vote.
    pub async fn cast_exclusive_up(
        &self,
        voteable: &dyn Voteable,
        points: u32,
    ) -> Result<Vote, VotingError> {
        self.cast_direction(voteable, Direction::Up, CastOptions::weighted(points).exclusive())
            .await
    }

    /// Replaces any vote on `voteable` with a down vote.
    pub async fn cast_exclusive_down(
        &self,
        voteable: &dyn Voteable,
        points: u32,
    ) -> Result<Vote, VotingError> {
        self.cast_direction(voteable, Direction::Down, CastOptions::weighted(points).exclusive())
            .await
    }

    /// Generic cast taking a raw direction.
    ///
    /// # Errors
    ///
    /// `VotingError::InvalidArgument` unless `direction` is `up` or `down`.
    /// The store is not touched in that case.
    pub async fn cast(
        &self,
        voteable: &dyn Voteable,
        direction: &str,
        options: CastOptions,
    ) -> Result<Vote, VotingError> {
        let direction = Direction::from_str(direction)?;
        self.cast_direction(voteable, direction, options).await
    }

    /// Records the vote. Exclusive casts clear and insert in one changeset,
    /// and the voteable's cached point total is refreshed in that same
    /// changeset.
    pub async fn cast_direction(
        &self,
        voteable: &dyn Voteable,
        direction: Direction,
        options: CastOptions,
    ) -> Result<Vote, VotingError> {
        let target = resolve(voteable)?;
        let vote = NewVote::new(self.voter.clone(), target.entity.clone(), direction, options.points);

        let outcome = self
            .repository
            .persist_changeset(&Changeset {
                clear: options.exclusive.then_some(&vote.pair),
                insert: Some(&vote),
                refresh_counter: target.counter_target(),
            })
            .await
            .map_err(VotingError::from)
            .inspect_err(|error| {
                if error.is_duplicate_vote() {
                    warn!(voter = %self.voter, voteable = %target.entity, "Vote rejected as duplicate");
                }
            })?;

        debug!(
            voter = %self.voter,
            voteable = %target.entity,
            %direction,
            points = vote.points,
            exclusive = options.exclusive,
            replaced = outcome.removed,
            "Vote cast"
        );

        outcome.inserted.ok_or_else(|| {
            VotingError::Repository(VoteRepositoryError::InconsistentChangeset(
                "insert step returned no vote".to_string(),
            ))
        })
    }

    /// Removes every vote this voter cast on `voteable`.
    ///
    /// Clearing a pair without votes is a no-op.
    ///
    /// # Returns
    ///
    /// The number of votes removed.
    pub async fn clear_votes(&self, voteable: &dyn Voteable) -> Result<u64, VotingError> {
        let target = resolve(voteable)?;
        let pair = VotePair::new(self.voter.clone(), target.entity.clone());

        let outcome = self
            .repository
            .persist_changeset(&Changeset {
                clear: Some(&pair),
                insert: None,
                refresh_counter: target.counter_target(),
            })
            .await?;

        debug!(voter = %self.voter, voteable = %target.entity, removed = outcome.removed, "Votes cleared");
        Ok(outcome.removed)
    }

    /// Removes every vote of this voter, for use when the voter itself is
    /// deleted. Existing cached point totals of the affected voteables are
    /// refreshed.
    pub async fn purge(&self) -> Result<u64, VotingError> {
        let removed = self.repository.delete_votes_by_voter(&self.voter).await?;
        debug!(voter = %self.voter, removed, "Voter purged");
        Ok(removed)
    }

    /// Number of votes this voter cast on any voteable.
    pub async fn vote_count(&self, filter: VoteFilter) -> Result<i64, VotingError> {
        let query = VoteQuery::by_voter(&self.voter).with_filter(filter);
        Ok(self.repository.count_votes(&query).await?)
    }

    /// Signed sum of the points of this voter's votes.
    pub async fn point_count(&self, filter: VoteFilter) -> Result<i64, VotingError> {
        let query = VoteQuery::by_voter(&self.voter).with_filter(filter);
        Ok(self.repository.sum_points(&query).await?)
    }

    /// This voter's votes, newest first.
    pub async fn votes(&self, filter: VoteFilter) -> Result<Vec<Vote>, VotingError> {
        let query = VoteQuery::by_voter(&self.voter).with_filter(filter);
        let mut votes = self.repository.query_votes(&query).await?;
        votes.reverse();
        Ok(votes)
    }

    pub async fn voted_on(&self, voteable: &dyn Voteable) -> Result<bool, VotingError> {
        let target = resolve(voteable)?;
        let query = VoteQuery::for_pair(&VotePair::new(self.voter.clone(), target.entity));
        Ok(self.repository.count_votes(&query).await? > 0)
    }

    pub async fn voted_for(&self, voteable: &dyn Voteable) -> Result<bool, VotingError> {
        self.voted_in_direction(voteable, Direction::Up).await
    }

    pub async fn voted_against(&self, voteable: &dyn Voteable) -> Result<bool, VotingError> {
        self.voted_in_direction(voteable, Direction::Down).await
    }

    /// Whether this voter voted on `voteable` in the given raw direction.
    ///
    /// # Errors
    ///
    /// `VotingError::InvalidArgument` unless `direction` is `up` or `down`.
    pub async fn voted_which_way(
        &self,
        voteable: &dyn Voteable,
        direction: &str,
    ) -> Result<bool, VotingError> {
        let direction = Direction::from_str(direction)?;
        self.voted_in_direction(voteable, direction).await
    }

    pub async fn voted_in_direction(
        &self,
        voteable: &dyn Voteable,
        direction: Direction,
    ) -> Result<bool, VotingError> {
        let target = resolve(voteable)?;
        let query = VoteQuery::for_pair(&VotePair::new(self.voter.clone(), target.entity))
            .with_direction(direction);
        Ok(self.repository.count_votes(&query).await? > 0)
    }
}
