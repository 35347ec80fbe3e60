//! In-memory implementation of the vote repository.
//!
//! Keeps the whole ledger behind a single `tokio::sync::RwLock`. Mutations,
//! including whole changesets, run under the write lock, which makes them
//! atomic and isolated; reads run under the read lock and therefore observe a
//! consistent snapshot.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use vote_ledger_shared::types::{
    Changeset, ChangesetOutcome, EntityRef, NewVote, TallyEntry, Vote, VoteId, VotePair,
    VoteQuery,
};

use crate::config::LedgerConfig;
use crate::errors::VoteRepositoryError;
use crate::interfaces::{DerivedField, VoteRepository};

#[derive(Default)]
struct Ledger {
    /// Votes in id order.
    votes: Vec<Vote>,
    last_id: VoteId,
    derived: BTreeMap<(EntityRef, DerivedField), i64>,
}

impl Ledger {
    fn insert(&mut self, vote: &NewVote, config: &LedgerConfig) -> Result<Vote, VoteRepositoryError> {
        if config.enforce_uniqueness && self.votes.iter().any(|v| v.belongs_to(&vote.pair)) {
            return Err(VoteRepositoryError::duplicate_vote(
                &vote.pair.voter,
                &vote.pair.voteable,
            ));
        }

        self.last_id += 1;
        let now = Utc::now();
        let stored = Vote {
            id: self.last_id,
            voter: vote.pair.voter.clone(),
            voteable: vote.pair.voteable.clone(),
            direction: vote.direction,
            points: vote.points,
            created_at: now,
            updated_at: now,
        };
        self.votes.push(stored.clone());
        Ok(stored)
    }

    /// Removes and returns the votes of `pair`.
    fn take_matching(&mut self, pair: &VotePair) -> Vec<Vote> {
        let (removed, kept): (Vec<Vote>, Vec<Vote>) = std::mem::take(&mut self.votes)
            .into_iter()
            .partition(|v| v.belongs_to(pair));
        self.votes = kept;
        removed
    }

    /// Puts back votes taken by `take_matching`, keeping id order.
    fn restore(&mut self, removed: Vec<Vote>) {
        if removed.is_empty() {
            return;
        }
        self.votes.extend(removed);
        self.votes.sort_by_key(|v| v.id);
    }

    fn select(&self, query: &VoteQuery) -> impl Iterator<Item = &Vote> {
        self.votes.iter().filter(move |v| query.matches(v))
    }

    fn point_total(&self, voteable: &EntityRef) -> i64 {
        self.votes
            .iter()
            .filter(|v| &v.voteable == voteable)
            .map(|v| v.points)
            .sum()
    }

    fn refresh_counter(&mut self, voteable: &EntityRef) -> i64 {
        let total = self.point_total(voteable);
        self.derived
            .insert((voteable.clone(), DerivedField::CachedPointTotal), total);
        total
    }
}

/// Vote repository held entirely in process memory.
///
/// Suitable for tests and for embedding the ledger in a single process.
#[derive(Default)]
pub struct InMemoryVoteRepository {
    ledger: RwLock<Ledger>,
    config: LedgerConfig,
}

impl InMemoryVoteRepository {
    /// Creates an empty repository with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository with a custom configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn insert_vote(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError> {
        self.ledger.write().await.insert(vote, &self.config)
    }

    async fn delete_matching(&self, pair: &VotePair) -> Result<u64, VoteRepositoryError> {
        Ok(self.ledger.write().await.take_matching(pair).len() as u64)
    }

    async fn query_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, VoteRepositoryError> {
        let ledger = self.ledger.read().await;
        let mut votes: Vec<Vote> = ledger.select(query).cloned().collect();
        votes.sort_by_key(|v| (v.created_at, v.id));
        Ok(votes)
    }

    async fn count_votes(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        Ok(self.ledger.read().await.select(query).count() as i64)
    }

    async fn sum_points(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        Ok(self.ledger.read().await.select(query).map(|v| v.points).sum())
    }

    async fn write_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
        value: i64,
    ) -> Result<(), VoteRepositoryError> {
        self.ledger
            .write()
            .await
            .derived
            .insert((voteable.clone(), field), value);
        Ok(())
    }

    async fn read_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
    ) -> Result<Option<i64>, VoteRepositoryError> {
        Ok(self
            .ledger
            .read()
            .await
            .derived
            .get(&(voteable.clone(), field))
            .copied())
    }

    async fn list_derived_field(
        &self,
        kind: &str,
        field: DerivedField,
    ) -> Result<Vec<TallyEntry>, VoteRepositoryError> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .derived
            .iter()
            .filter(|((voteable, f), _)| *f == field && voteable.is_kind(kind))
            .map(|((voteable, _), value)| TallyEntry {
                voteable: voteable.clone(),
                points: *value,
            })
            .collect())
    }

    async fn persist_changeset(
        &self,
        changeset: &Changeset<'_>,
    ) -> Result<ChangesetOutcome, VoteRepositoryError> {
        let mut ledger = self.ledger.write().await;
        let mut outcome = ChangesetOutcome::default();

        let removed = match changeset.clear {
            Some(pair) => ledger.take_matching(pair),
            None => Vec::new(),
        };
        outcome.removed = removed.len() as u64;

        if let Some(vote) = changeset.insert {
            match ledger.insert(vote, &self.config) {
                Ok(stored) => outcome.inserted = Some(stored),
                Err(error) => {
                    ledger.restore(removed);
                    return Err(error);
                }
            }
        }
        if let Some(voteable) = changeset.refresh_counter {
            outcome.counter = Some(ledger.refresh_counter(voteable));
        }

        debug!(
            removed = outcome.removed,
            inserted = outcome.inserted.as_ref().map(|v| v.id),
            counter = outcome.counter,
            "Changeset applied"
        );
        Ok(outcome)
    }

    async fn adjust_timestamps(
        &self,
        vote_id: VoteId,
        created_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        let mut ledger = self.ledger.write().await;
        let vote = ledger
            .votes
            .iter_mut()
            .find(|v| v.id == vote_id)
            .ok_or(VoteRepositoryError::VoteNotFound(vote_id))?;
        vote.created_at = created_at;
        vote.updated_at = created_at;
        Ok(vote.clone())
    }

    async fn delete_votes_by_voter(&self, voter: &EntityRef) -> Result<u64, VoteRepositoryError> {
        let mut ledger = self.ledger.write().await;
        let affected: HashSet<EntityRef> = ledger
            .votes
            .iter()
            .filter(|v| &v.voter == voter)
            .map(|v| v.voteable.clone())
            .collect();

        let before = ledger.votes.len();
        ledger.votes.retain(|v| &v.voter != voter);
        let removed = (before - ledger.votes.len()) as u64;

        for voteable in &affected {
            if ledger
                .derived
                .contains_key(&(voteable.clone(), DerivedField::CachedPointTotal))
            {
                ledger.refresh_counter(voteable);
            }
        }
        Ok(removed)
    }
}
