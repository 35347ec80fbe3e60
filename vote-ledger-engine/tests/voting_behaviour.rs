//! Behaviour of the voting engine against the in-memory ledger.
//!
//! Votes are backdated through `VoteRepository::adjust_timestamps` to
//! exercise the tally windows.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use vote_ledger_engine::{
    CastOptions, TallyEngine, Voteable, VoteableAggregator, VoterService, VotingError,
};
use vote_ledger_repository::{
    DerivedField, InMemoryVoteRepository, VoteRepository, VoteRepositoryError,
};
use vote_ledger_shared::types::{
    Changeset, ChangesetOutcome, EntityRef, NewVote, TallyEntry, TallyQuery, TimeWindow, Vote,
    VoteFilter, VoteId, VotePair, VoteQuery,
};

// ============================================================================
// Fixtures
// ============================================================================

/// A voteable that keeps a cached point total.
struct PcItem {
    id: u32,
}

impl Voteable for PcItem {
    fn voteable_ref(&self) -> EntityRef {
        EntityRef::new("PcItem", self.id)
    }

    fn caches_point_total(&self) -> bool {
        true
    }
}

/// A presentation wrapper around another voteable.
struct Presenter<'a> {
    source: &'a dyn Voteable,
}

impl Voteable for Presenter<'_> {
    fn voteable_ref(&self) -> EntityRef {
        EntityRef::new("Presenter", 0)
    }

    fn is_wrapped(&self) -> bool {
        true
    }

    fn unwrap_entity(&self) -> Option<&dyn Voteable> {
        Some(self.source)
    }
}

fn make_ledger() -> Arc<InMemoryVoteRepository> {
    Arc::new(InMemoryVoteRepository::new())
}

fn make_user(ledger: &Arc<InMemoryVoteRepository>, id: u32) -> VoterService {
    VoterService::new(ledger.clone(), EntityRef::new("User", id))
}

fn make_item(id: u32) -> EntityRef {
    EntityRef::new("Item", id)
}

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

async fn backdate(ledger: &Arc<InMemoryVoteRepository>, vote: &Vote, created_at: DateTime<Utc>) {
    ledger.adjust_timestamps(vote.id, created_at).await.unwrap();
}

fn items_only(window: TimeWindow) -> TallyQuery {
    TallyQuery::new(window).for_kind("Item")
}

// ============================================================================
// Voter Tests
// ============================================================================

#[tokio::test]
async fn test_voter_instance_methods() {
    let ledger = make_ledger();
    let user_for = make_user(&ledger, 1);
    let weighted_user_for = make_user(&ledger, 2);
    let user_against = make_user(&ledger, 3);
    let weighted_user_against = make_user(&ledger, 4);
    let item = make_item(1);

    user_for.cast_up(&item, 1).await.unwrap();
    assert!(user_for.cast_up(&item, 1).await.unwrap_err().is_duplicate_vote());
    assert!(user_for.voted_for(&item).await.unwrap());
    assert!(!user_for.voted_against(&item).await.unwrap());
    assert!(user_for.voted_on(&item).await.unwrap());
    assert_eq!(user_for.vote_count(VoteFilter::All).await.unwrap(), 1);
    assert_eq!(user_for.vote_count(VoteFilter::Up).await.unwrap(), 1);
    assert_eq!(user_for.vote_count(VoteFilter::Down).await.unwrap(), 0);
    assert!(user_for.voted_which_way(&item, "up").await.unwrap());
    assert!(!user_for.voted_which_way(&item, "down").await.unwrap());
    assert!(matches!(
        user_for.voted_which_way(&item, "foo").await,
        Err(VotingError::InvalidArgument(_))
    ));

    weighted_user_for.cast_up(&item, 5).await.unwrap();
    assert!(weighted_user_for.cast_up(&item, 5).await.unwrap_err().is_duplicate_vote());
    assert_eq!(weighted_user_for.point_count(VoteFilter::All).await.unwrap(), 5);
    assert_eq!(weighted_user_for.point_count(VoteFilter::Up).await.unwrap(), 5);
    assert_eq!(weighted_user_for.point_count(VoteFilter::Down).await.unwrap(), 0);

    user_against.cast_down(&item, 1).await.unwrap();
    assert!(user_against.cast_down(&item, 1).await.unwrap_err().is_duplicate_vote());
    assert!(!user_against.voted_for(&item).await.unwrap());
    assert!(user_against.voted_against(&item).await.unwrap());
    assert_eq!(user_against.vote_count(VoteFilter::Down).await.unwrap(), 1);

    weighted_user_against.cast_down(&item, 5).await.unwrap();
    assert_eq!(weighted_user_against.point_count(VoteFilter::All).await.unwrap(), -5);
    assert_eq!(weighted_user_against.point_count(VoteFilter::Up).await.unwrap(), 0);
    assert_eq!(weighted_user_against.point_count(VoteFilter::Down).await.unwrap(), -5);

    weighted_user_against.cast_exclusive_up(&item, 1).await.unwrap();
    assert!(weighted_user_against.voted_for(&item).await.unwrap());
    assert!(!weighted_user_against.voted_against(&item).await.unwrap());

    weighted_user_for.cast_exclusive_down(&item, 1).await.unwrap();
    assert!(weighted_user_for.voted_against(&item).await.unwrap());
    assert_eq!(weighted_user_for.vote_count(VoteFilter::All).await.unwrap(), 1);

    weighted_user_for.clear_votes(&item).await.unwrap();
    assert_eq!(weighted_user_for.vote_count(VoteFilter::All).await.unwrap(), 0);

    weighted_user_against.clear_votes(&item).await.unwrap();
    assert_eq!(weighted_user_against.vote_count(VoteFilter::All).await.unwrap(), 0);

    assert!(matches!(
        weighted_user_for.cast(&item, "foo", CastOptions::default()).await,
        Err(VotingError::InvalidArgument(_))
    ));
}

// ============================================================================
// Voteable Tests
// ============================================================================

#[tokio::test]
async fn test_voteable_instance_methods() {
    let ledger = make_ledger();
    let user_for = make_user(&ledger, 1);
    let another_user_for = make_user(&ledger, 2);
    let user_against = make_user(&ledger, 3);
    let item = make_item(1);
    let aggregator = VoteableAggregator::new(ledger.clone(), &item).unwrap();

    user_for.cast_up(&item, 1).await.unwrap();
    another_user_for.cast_up(&item, 1).await.unwrap();

    assert_eq!(aggregator.votes_for().await.unwrap(), 2);
    assert_eq!(aggregator.votes_against().await.unwrap(), 0);
    assert_eq!(aggregator.plusminus().await.unwrap(), 2);

    user_against.cast_down(&item, 1).await.unwrap();

    assert_eq!(aggregator.votes_against().await.unwrap(), 1);
    assert_eq!(aggregator.plusminus().await.unwrap(), 1);
    assert_eq!(aggregator.votes_count().await.unwrap(), 3);
    assert_eq!(aggregator.percent_for().await.unwrap(), 67);
    assert_eq!(aggregator.percent_against().await.unwrap(), 33);

    let voters = aggregator.voters_who_voted().await.unwrap();
    assert_eq!(voters.len(), 3);
    for voter in [&user_for, &another_user_for, &user_against] {
        assert!(voters.contains(voter.voter()));
        assert!(aggregator.voted_by(voter.voter()).await.unwrap());
    }
    assert!(!aggregator.voted_by(&EntityRef::new("User", 99)).await.unwrap());
}

#[tokio::test]
async fn test_voteable_points() {
    let ledger = make_ledger();
    let item = make_item(1);
    let aggregator = VoteableAggregator::new(ledger.clone(), &item).unwrap();

    make_user(&ledger, 1).cast_up(&item, 5).await.unwrap();
    make_user(&ledger, 2).cast_up(&item, 1).await.unwrap();

    assert_eq!(aggregator.points_for().await.unwrap(), 6);
    assert_eq!(aggregator.points_against().await.unwrap(), 0);
    assert_eq!(aggregator.points_count().await.unwrap(), 6);

    make_user(&ledger, 3).cast_down(&item, 10).await.unwrap();

    assert_eq!(aggregator.points_against().await.unwrap(), 10);
    assert_eq!(aggregator.points_count().await.unwrap(), -4);
    assert_eq!(aggregator.votes_count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_voteable_points_cached() {
    let ledger = make_ledger();
    let item = PcItem { id: 1 };
    let aggregator = VoteableAggregator::new(ledger.clone(), &item).unwrap();
    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(0));

    make_user(&ledger, 1).cast_up(&item, 5).await.unwrap();
    make_user(&ledger, 2).cast_up(&item, 1).await.unwrap();

    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(6));
    assert_eq!(aggregator.points_count().await.unwrap(), 6);

    let user_against = make_user(&ledger, 3);
    user_against.cast_down(&item, 10).await.unwrap();
    assert_eq!(aggregator.points_against().await.unwrap(), 10);
    assert_eq!(aggregator.points_count().await.unwrap(), -4);
    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(-4));

    user_against.clear_votes(&item).await.unwrap();
    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(6));

    user_against.purge().await.unwrap();
    make_user(&ledger, 1).purge().await.unwrap();
    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(1));
    assert_eq!(aggregator.points_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cached_counter_never_drifts() {
    let ledger = make_ledger();
    let item = PcItem { id: 7 };
    let aggregator = VoteableAggregator::new(ledger.clone(), &item).unwrap();
    let users: Vec<_> = (1..=4).map(|id| make_user(&ledger, id)).collect();

    for (step, user) in users.iter().cycle().take(12).enumerate() {
        match step % 3 {
            0 => {
                user.cast_exclusive_up(&item, step as u32 + 1).await.unwrap();
            }
            1 => {
                user.cast_exclusive_down(&item, 2).await.unwrap();
            }
            _ => {
                user.clear_votes(&item).await.unwrap();
            }
        }
        assert_eq!(
            aggregator.cached_point_total().await.unwrap(),
            Some(aggregator.points_count().await.unwrap())
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_casts_keep_counter_in_sync() {
    let ledger = make_ledger();
    let mut handles = Vec::new();

    // Exclusive voters flip their vote repeatedly while others cast once.
    for id in 1..=4u32 {
        let user = make_user(&ledger, id);
        handles.push(tokio::spawn(async move {
            let item = PcItem { id: 9 };
            for round in 0..10u32 {
                if round % 2 == 0 {
                    user.cast_exclusive_up(&item, round + 1).await?;
                } else {
                    user.cast_exclusive_down(&item, 2).await?;
                }
            }
            Ok::<_, VotingError>(())
        }));
    }
    for id in 5..=12u32 {
        let user = make_user(&ledger, id);
        handles.push(tokio::spawn(async move {
            let item = PcItem { id: 9 };
            user.cast_up(&item, id).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let item = PcItem { id: 9 };
    for id in 1..=12u32 {
        assert_eq!(
            make_user(&ledger, id).vote_count(VoteFilter::All).await.unwrap(),
            1
        );
    }
    let aggregator = VoteableAggregator::new(ledger.clone(), &item).unwrap();
    assert_eq!(aggregator.votes_count().await.unwrap(), 12);
    // Every exclusive voter ends on a two point down vote.
    assert_eq!(aggregator.points_count().await.unwrap(), (5..=12).sum::<i64>() - 8);
    assert_eq!(aggregator.cached_point_total().await.unwrap(), Some(60));
}

#[tokio::test]
async fn test_wrapper_and_entity_share_votes() {
    let ledger = make_ledger();
    let item = PcItem { id: 2 };
    let presenter = Presenter { source: &item };
    let user = make_user(&ledger, 1);

    user.cast_up(&presenter, 3).await.unwrap();

    assert!(user.voted_on(&item).await.unwrap());
    assert!(user.cast_down(&item, 1).await.unwrap_err().is_duplicate_vote());

    let through_wrapper = VoteableAggregator::new(ledger.clone(), &presenter).unwrap();
    let direct = VoteableAggregator::new(ledger.clone(), &item).unwrap();
    assert_eq!(through_wrapper.voteable(), direct.voteable());
    assert_eq!(through_wrapper.summary().await.unwrap(), direct.summary().await.unwrap());
    assert_eq!(direct.cached_point_total().await.unwrap(), Some(3));
}

// ============================================================================
// Tally Tests
// ============================================================================

#[tokio::test]
async fn test_tally_empty() {
    let engine = TallyEngine::new(make_ledger());
    assert!(engine.tally(&TallyQuery::default()).await.unwrap().is_empty());
    assert!(engine.rank_tally(&TallyQuery::default(), false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tally_points() {
    let ledger = make_ledger();
    let item = make_item(1);

    let vote = make_user(&ledger, 1).cast_up(&item, 5).await.unwrap();
    backdate(&ledger, &vote, days_ago(3)).await;
    let vote = make_user(&ledger, 2).cast_down(&item, 3).await.unwrap();
    backdate(&ledger, &vote, days_ago(5)).await;

    let tally = TallyEngine::new(ledger).tally(&TallyQuery::default()).await.unwrap();
    assert_eq!(tally, vec![TallyEntry { voteable: item, points: 2 }]);
}

#[tokio::test]
async fn test_tally_starts_at() {
    let ledger = make_ledger();
    let vote = make_user(&ledger, 1).cast_up(&make_item(1), 1).await.unwrap();
    backdate(&ledger, &vote, days_ago(3)).await;
    let engine = TallyEngine::new(ledger);

    let recent = items_only(TimeWindow::since(days_ago(2)));
    let wider = items_only(TimeWindow::since(days_ago(4)));
    assert_eq!(engine.tally(&recent).await.unwrap().len(), 0);
    assert_eq!(engine.tally(&wider).await.unwrap().len(), 1);
    assert_eq!(engine.rank_tally(&recent, false).await.unwrap().len(), 0);
    assert_eq!(engine.rank_tally(&wider, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tally_end_at() {
    let ledger = make_ledger();
    let vote = make_user(&ledger, 1).cast_up(&make_item(1), 1).await.unwrap();
    backdate(&ledger, &vote, days_from_now(3)).await;
    let engine = TallyEngine::new(ledger);

    let sooner = items_only(TimeWindow::until(days_from_now(2)));
    let later = items_only(TimeWindow::until(days_from_now(4)));
    assert_eq!(engine.tally(&sooner).await.unwrap().len(), 0);
    assert_eq!(engine.tally(&later).await.unwrap().len(), 1);
    assert_eq!(engine.rank_tally(&sooner, false).await.unwrap().len(), 0);
    assert_eq!(engine.rank_tally(&later, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tally_between_start_at_end_at() {
    let ledger = make_ledger();
    let user = make_user(&ledger, 1);

    let vote = user.cast_up(&make_item(1), 1).await.unwrap();
    backdate(&ledger, &vote, days_ago(2)).await;
    let vote = user.cast_up(&make_item(2), 1).await.unwrap();
    backdate(&ledger, &vote, days_from_now(3)).await;
    let engine = TallyEngine::new(ledger);

    let narrow = items_only(TimeWindow::between(days_ago(3), days_from_now(2)));
    let wide = items_only(TimeWindow::between(days_ago(3), days_from_now(4)));
    assert_eq!(engine.tally(&narrow).await.unwrap().len(), 1);
    assert_eq!(engine.tally(&wide).await.unwrap().len(), 2);
    assert_eq!(engine.rank_tally(&narrow, false).await.unwrap().len(), 1);
    assert_eq!(engine.rank_tally(&wide, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_tally_scoped_to_kind() {
    let ledger = make_ledger();
    let user = make_user(&ledger, 1);
    user.cast_up(&make_item(1), 1).await.unwrap();
    user.cast_up(&PcItem { id: 1 }, 1).await.unwrap();
    let engine = TallyEngine::new(ledger);

    assert_eq!(engine.tally(&TallyQuery::default()).await.unwrap().len(), 2);
    assert_eq!(
        engine.rank_tally(&items_only(TimeWindow::unbounded()), false).await.unwrap(),
        vec![make_item(1)]
    );
}

#[tokio::test]
async fn test_rank_tally_inclusion() {
    let ledger = make_ledger();
    make_user(&ledger, 1).cast_up(&make_item(1), 1).await.unwrap();

    let ranked = TallyEngine::new(ledger)
        .rank_tally(&TallyQuery::default(), false)
        .await
        .unwrap();
    assert!(ranked.contains(&make_item(1)));
    assert!(!ranked.contains(&make_item(2)));
}

#[tokio::test]
async fn test_rank_tally_ordering() {
    let ledger = make_ledger();
    let user = make_user(&ledger, 1);
    let item_for = make_item(1);
    let item_against = make_item(2);
    user.cast_up(&item_for, 1).await.unwrap();
    user.cast_down(&item_against, 1).await.unwrap();
    let engine = TallyEngine::new(ledger);

    assert_eq!(
        engine.rank_tally(&TallyQuery::default(), false).await.unwrap(),
        vec![item_for.clone(), item_against.clone()]
    );
    assert_eq!(
        engine.rank_tally(&TallyQuery::default(), true).await.unwrap(),
        vec![item_against, item_for.clone()]
    );
    assert_eq!(
        engine
            .rank_tally(&TallyQuery::default().with_limit(1), false)
            .await
            .unwrap(),
        vec![item_for]
    );
}

#[tokio::test]
async fn test_rank_tally_ties_are_stable() {
    let ledger = make_ledger();
    let user = make_user(&ledger, 1);
    for id in [3, 1, 2] {
        user.cast_up(&make_item(id), 1).await.unwrap();
    }
    let engine = TallyEngine::new(ledger);

    let expected = vec![make_item(3), make_item(1), make_item(2)];
    for _ in 0..3 {
        assert_eq!(
            engine.rank_tally(&TallyQuery::default(), false).await.unwrap(),
            expected
        );
    }
}

#[tokio::test]
async fn test_rank_by_cached_total() {
    let ledger = make_ledger();
    let user = make_user(&ledger, 1);
    let other = make_user(&ledger, 2);
    user.cast_up(&PcItem { id: 1 }, 2).await.unwrap();
    user.cast_down(&PcItem { id: 2 }, 1).await.unwrap();
    other.cast_up(&PcItem { id: 3 }, 5).await.unwrap();
    user.cast_up(&make_item(9), 50).await.unwrap();
    let engine = TallyEngine::new(ledger);

    let pc = |id: u32| EntityRef::new("PcItem", id);
    assert_eq!(
        engine.rank_by_cached_total("PcItem", false, None).await.unwrap(),
        vec![pc(3), pc(1), pc(2)]
    );
    assert_eq!(
        engine.rank_by_cached_total("PcItem", true, Some(2)).await.unwrap(),
        vec![pc(2), pc(1)]
    );
    assert!(engine.rank_by_cached_total("Item", false, None).await.unwrap().is_empty());
}

// ============================================================================
// Failure Propagation Tests
// ============================================================================

#[derive(Clone, Copy)]
enum Failure {
    Timeout,
    Unavailable,
}

/// Wraps the in-memory ledger and fails every call once armed.
struct FailingRepository {
    inner: InMemoryVoteRepository,
    failure: Mutex<Option<Failure>>,
}

impl FailingRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryVoteRepository::new(),
            failure: Mutex::new(None),
        }
    }

    async fn arm(&self, failure: Failure) {
        *self.failure.lock().await = Some(failure);
    }

    async fn check(&self) -> Result<(), VoteRepositoryError> {
        match *self.failure.lock().await {
            Some(Failure::Timeout) => Err(VoteRepositoryError::StoreTimeout("Mock timeout".to_string())),
            Some(Failure::Unavailable) => {
                Err(VoteRepositoryError::StoreUnavailable("Mock outage".to_string()))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VoteRepository for FailingRepository {
    async fn insert_vote(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError> {
        self.check().await?;
        self.inner.insert_vote(vote).await
    }

    async fn delete_matching(&self, pair: &VotePair) -> Result<u64, VoteRepositoryError> {
        self.check().await?;
        self.inner.delete_matching(pair).await
    }

    async fn query_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, VoteRepositoryError> {
        self.check().await?;
        self.inner.query_votes(query).await
    }

    async fn count_votes(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        self.check().await?;
        self.inner.count_votes(query).await
    }

    async fn sum_points(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        self.check().await?;
        self.inner.sum_points(query).await
    }

    async fn write_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
        value: i64,
    ) -> Result<(), VoteRepositoryError> {
        self.check().await?;
        self.inner.write_derived_field(voteable, field, value).await
    }

    async fn read_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
    ) -> Result<Option<i64>, VoteRepositoryError> {
        self.check().await?;
        self.inner.read_derived_field(voteable, field).await
    }

    async fn list_derived_field(
        &self,
        kind: &str,
        field: DerivedField,
    ) -> Result<Vec<TallyEntry>, VoteRepositoryError> {
        self.check().await?;
        self.inner.list_derived_field(kind, field).await
    }

    async fn persist_changeset(
        &self,
        changeset: &Changeset<'_>,
    ) -> Result<ChangesetOutcome, VoteRepositoryError> {
        self.check().await?;
        self.inner.persist_changeset(changeset).await
    }

    async fn adjust_timestamps(
        &self,
        vote_id: VoteId,
        created_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        self.check().await?;
        self.inner.adjust_timestamps(vote_id, created_at).await
    }

    async fn delete_votes_by_voter(&self, voter: &EntityRef) -> Result<u64, VoteRepositoryError> {
        self.check().await?;
        self.inner.delete_votes_by_voter(voter).await
    }
}

#[tokio::test]
async fn test_store_timeout_surfaces_unchanged() {
    let repository = Arc::new(FailingRepository::new());
    let user = VoterService::new(repository.clone(), EntityRef::new("User", 1));
    let item = make_item(1);
    user.cast_up(&item, 1).await.unwrap();

    repository.arm(Failure::Timeout).await;

    assert!(matches!(user.cast_down(&item, 1).await, Err(VotingError::StoreTimeout(_))));
    assert!(matches!(user.voted_on(&item).await, Err(VotingError::StoreTimeout(_))));
    let aggregator = VoteableAggregator::new(repository.clone(), &item).unwrap();
    assert!(matches!(aggregator.percent_for().await, Err(VotingError::StoreTimeout(_))));
    let engine = TallyEngine::new(repository.clone());
    assert!(matches!(
        engine.tally(&TallyQuery::default()).await,
        Err(VotingError::StoreTimeout(_))
    ));
}

#[tokio::test]
async fn test_store_outage_surfaces_unchanged() {
    let repository = Arc::new(FailingRepository::new());
    let user = VoterService::new(repository.clone(), EntityRef::new("User", 1));
    repository.arm(Failure::Unavailable).await;

    assert!(matches!(
        user.clear_votes(&make_item(1)).await,
        Err(VotingError::StoreUnavailable(_))
    ));
    assert!(matches!(user.purge().await, Err(VotingError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_invalid_direction_never_reaches_store() {
    let repository = Arc::new(FailingRepository::new());
    let user = VoterService::new(repository.clone(), EntityRef::new("User", 1));
    repository.arm(Failure::Unavailable).await;

    assert!(matches!(
        user.cast(&make_item(1), "sideways", CastOptions::default()).await,
        Err(VotingError::InvalidArgument(_))
    ));
}
