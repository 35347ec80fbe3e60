//! PostgreSQL implementation of the vote ledger repository.
//!
//! Provides a PostgreSQL backend for the `VoteRepository` trait with
//! connection pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Uniqueness enforced by a partial unique index, never by read-then-write
//! - Changesets applied in a single transaction, serialized per voteable
//!   counter and per voter/voteable pair with transaction-scoped advisory locks
//! - Dynamic filters built with `sqlx::QueryBuilder`
//!
//! ## Database Tables
//!
//! - `votes`: the vote ledger
//! - `voteable_counters`: cached point totals, written without entity validation
mod rows;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;
use vote_ledger_shared::types::{
    Changeset, ChangesetOutcome, EntityRef, NewVote, TallyEntry, Vote, VoteId, VotePair,
    VoteQuery,
};

use crate::config::LedgerConfig;
use crate::errors::VoteRepositoryError;
use crate::interfaces::{DerivedField, VoteRepository};
use rows::{TallyRow, VoteRow};

/// PostgreSQL implementation of the vote ledger repository.
pub struct PostgresVoteRepository {
    pool: PgPool,
    config: LedgerConfig,
}

impl PostgresVoteRepository {
    /// Creates a repository with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the ledger schema
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, LedgerConfig::default())
    }

    /// Creates a repository with a custom configuration.
    ///
    /// Votes inserted while `enforce_uniqueness` is off are excluded from the
    /// unique index, so several of them may exist for the same pair.
    pub fn with_config(pool: PgPool, config: LedgerConfig) -> Self {
        Self { pool, config }
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), VoteRepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Checks if the ledger tables are created in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If every table exists
    pub async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError> {
        for table in ["votes", "voteable_counters"] {
            let table_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Holds a transaction-scoped advisory lock on `key` until commit or rollback.
    async fn lock_key_tx(
        &self,
        key: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), VoteRepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(key)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Serializes changesets touching the same pair.
    async fn lock_pair_tx(
        &self,
        pair: &VotePair,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), VoteRepositoryError> {
        self.lock_key_tx(&format!("pair|{}|{}", pair.voter, pair.voteable), tx)
            .await
    }

    /// Serializes every writer that re-derives the counter of `voteable`.
    ///
    /// Taken before the pair lock and before any vote row is touched, so the
    /// sum read afterwards sees every earlier writer's commit.
    async fn lock_counter_tx(
        &self,
        voteable: &EntityRef,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), VoteRepositoryError> {
        self.lock_key_tx(&format!("counter|{voteable}"), tx).await
    }

    async fn insert_vote_tx(
        &self,
        vote: &NewVote,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vote, VoteRepositoryError> {
        let row: VoteRow = sqlx::query_as(
            r#"
            INSERT INTO votes (voter_kind, voter_id, voteable_kind, voteable_id, direction, points, is_unique)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, voter_kind, voter_id, voteable_kind, voteable_id, direction, points, created_at, updated_at
            "#,
        )
        .bind(&vote.pair.voter.kind)
        .bind(&vote.pair.voter.id)
        .bind(&vote.pair.voteable.kind)
        .bind(&vote.pair.voteable.id)
        .bind(vote.direction.as_i16())
        .bind(vote.points)
        .bind(self.config.enforce_uniqueness)
        .fetch_one(&mut **tx)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                VoteRepositoryError::duplicate_vote(&vote.pair.voter, &vote.pair.voteable)
            }
            other => other.into(),
        })?;

        row.try_into()
    }

    async fn delete_matching_tx(
        &self,
        pair: &VotePair,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, VoteRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM votes
            WHERE voter_kind = $1 AND voter_id = $2 AND voteable_kind = $3 AND voteable_id = $4
            "#,
        )
        .bind(&pair.voter.kind)
        .bind(&pair.voter.id)
        .bind(&pair.voteable.kind)
        .bind(&pair.voteable.id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn refresh_counter_tx(
        &self,
        voteable: &EntityRef,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<i64, VoteRepositoryError> {
        let total = sum_points_with(&mut **tx, &VoteQuery::on_voteable(voteable)).await?;
        write_derived_field_with(&mut **tx, voteable, DerivedField::CachedPointTotal, total).await?;
        Ok(total)
    }
}

/// Appends a `WHERE` clause selecting the votes matched by `query`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &VoteQuery) {
    builder.push(" WHERE TRUE");
    if let Some(voter) = &query.voter {
        builder.push(" AND voter_kind = ").push_bind(voter.kind.clone());
        builder.push(" AND voter_id = ").push_bind(voter.id.clone());
    }
    if let Some(voteable) = &query.voteable {
        builder.push(" AND voteable_kind = ").push_bind(voteable.kind.clone());
        builder.push(" AND voteable_id = ").push_bind(voteable.id.clone());
    }
    if let Some(kind) = &query.voteable_kind {
        builder.push(" AND voteable_kind = ").push_bind(kind.clone());
    }
    if let Some(direction) = query.direction {
        builder.push(" AND direction = ").push_bind(direction.as_i16());
    }
    if let Some(start_at) = query.window.start_at {
        builder.push(" AND created_at >= ").push_bind(start_at);
    }
    if let Some(end_at) = query.window.end_at {
        builder.push(" AND created_at < ").push_bind(end_at);
    }
}

async fn sum_points_with<'e, E: PgExecutor<'e>>(
    executor: E,
    query: &VoteQuery,
) -> Result<i64, VoteRepositoryError> {
    let mut builder = QueryBuilder::new("SELECT COALESCE(SUM(points), 0)::BIGINT FROM votes");
    push_filters(&mut builder, query);
    Ok(builder.build_query_scalar::<i64>().fetch_one(executor).await?)
}

async fn write_derived_field_with<'e, E: PgExecutor<'e>>(
    executor: E,
    voteable: &EntityRef,
    field: DerivedField,
    value: i64,
) -> Result<(), VoteRepositoryError> {
    let column = field.column();
    sqlx::query(&format!(
        r#"
        INSERT INTO voteable_counters (voteable_kind, voteable_id, {column}, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (voteable_kind, voteable_id)
        DO UPDATE SET {column} = EXCLUDED.{column}, updated_at = EXCLUDED.updated_at
        "#
    ))
    .bind(&voteable.kind)
    .bind(&voteable.id)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn insert_vote(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let stored = self.insert_vote_tx(vote, &mut tx).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn delete_matching(&self, pair: &VotePair) -> Result<u64, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let removed = self.delete_matching_tx(pair, &mut tx).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn query_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, VoteRepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, voter_kind, voter_id, voteable_kind, voteable_id, direction, points, created_at, updated_at FROM votes",
        );
        push_filters(&mut builder, query);
        builder.push(" ORDER BY created_at, id");

        let rows: Vec<VoteRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Vote::try_from).collect()
    }

    async fn count_votes(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM votes");
        push_filters(&mut builder, query);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn sum_points(&self, query: &VoteQuery) -> Result<i64, VoteRepositoryError> {
        sum_points_with(&self.pool, query).await
    }

    async fn group_points(&self, query: &VoteQuery) -> Result<Vec<TallyEntry>, VoteRepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT voteable_kind, voteable_id, SUM(points)::BIGINT AS points FROM votes",
        );
        push_filters(&mut builder, query);
        builder.push(" GROUP BY voteable_kind, voteable_id ORDER BY MIN(created_at), MIN(id)");

        let rows: Vec<TallyRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(TallyEntry::from).collect())
    }

    async fn write_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
        value: i64,
    ) -> Result<(), VoteRepositoryError> {
        write_derived_field_with(&self.pool, voteable, field, value).await
    }

    async fn read_derived_field(
        &self,
        voteable: &EntityRef,
        field: DerivedField,
    ) -> Result<Option<i64>, VoteRepositoryError> {
        let value = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT {} FROM voteable_counters WHERE voteable_kind = $1 AND voteable_id = $2",
            field.column()
        ))
        .bind(&voteable.kind)
        .bind(&voteable.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn list_derived_field(
        &self,
        kind: &str,
        field: DerivedField,
    ) -> Result<Vec<TallyEntry>, VoteRepositoryError> {
        let rows: Vec<TallyRow> = sqlx::query_as(&format!(
            r#"
            SELECT voteable_kind, voteable_id, {} AS points
            FROM voteable_counters
            WHERE voteable_kind = $1
            ORDER BY voteable_id
            "#,
            field.column()
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TallyEntry::from).collect())
    }

    /// Applies a changeset in one transaction.
    ///
    /// Locks are taken in a fixed order: the counter of the refreshed voteable,
    /// then the cleared pair. Writers refreshing the same counter therefore
    /// commit one after another and the last one stores the full sum.
    /// Concurrent exclusive casts on one pair run one after another too.
    /// Any failure drops the transaction, which rolls every step back.
    async fn persist_changeset(
        &self,
        changeset: &Changeset<'_>,
    ) -> Result<ChangesetOutcome, VoteRepositoryError> {
        let mut outcome = ChangesetOutcome::default();
        if changeset.is_empty() {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;
        if let Some(voteable) = changeset.refresh_counter {
            self.lock_counter_tx(voteable, &mut tx).await?;
        }
        if let Some(pair) = changeset.clear {
            self.lock_pair_tx(pair, &mut tx).await?;
            outcome.removed = self.delete_matching_tx(pair, &mut tx).await?;
        }
        if let Some(vote) = changeset.insert {
            outcome.inserted = Some(self.insert_vote_tx(vote, &mut tx).await?);
        }
        if let Some(voteable) = changeset.refresh_counter {
            outcome.counter = Some(self.refresh_counter_tx(voteable, &mut tx).await?);
        }
        tx.commit().await?;

        debug!(
            removed = outcome.removed,
            inserted = outcome.inserted.as_ref().map(|v| v.id),
            counter = outcome.counter,
            "Changeset committed"
        );
        Ok(outcome)
    }

    async fn adjust_timestamps(
        &self,
        vote_id: VoteId,
        created_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        let row: Option<VoteRow> = sqlx::query_as(
            r#"
            UPDATE votes SET created_at = $2, updated_at = $2
            WHERE id = $1
            RETURNING id, voter_kind, voter_id, voteable_kind, voteable_id, direction, points, created_at, updated_at
            "#,
        )
        .bind(vote_id)
        .bind(created_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(VoteRepositoryError::VoteNotFound(vote_id))?.try_into()
    }

    /// Deletes every vote cast by `voter` and re-derives the existing counters
    /// of the voteables involved.
    ///
    /// Counter locks are taken in `(kind, id)` order so that two purges, or a
    /// purge and a changeset, never wait on each other in a cycle. Only votes
    /// on locked voteables are deleted.
    async fn delete_votes_by_voter(&self, voter: &EntityRef) -> Result<u64, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let voteables: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT DISTINCT voteable_kind, voteable_id FROM votes
            WHERE voter_kind = $1 AND voter_id = $2
            ORDER BY voteable_kind, voteable_id
            "#,
        )
        .bind(&voter.kind)
        .bind(&voter.id)
        .fetch_all(&mut *tx)
        .await?;

        for (kind, id) in &voteables {
            self.lock_counter_tx(&EntityRef::new(kind.as_str(), id.as_str()), &mut tx)
                .await?;
        }

        let (kinds, ids): (Vec<String>, Vec<String>) = voteables.into_iter().unzip();
        let deleted = sqlx::query(
            r#"
            DELETE FROM votes
            WHERE voter_kind = $1 AND voter_id = $2
              AND (voteable_kind, voteable_id) IN (SELECT * FROM UNNEST($3::text[], $4::text[]))
            "#,
        )
        .bind(&voter.kind)
        .bind(&voter.id)
        .bind(&kinds)
        .bind(&ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"
            UPDATE voteable_counters c
            SET cached_point_total = COALESCE(
                    (SELECT SUM(v.points) FROM votes v
                     WHERE v.voteable_kind = c.voteable_kind AND v.voteable_id = c.voteable_id),
                    0)::BIGINT,
                updated_at = NOW()
            WHERE (c.voteable_kind, c.voteable_id) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))
            "#,
        )
        .bind(&kinds)
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(voter = %voter, deleted, "Votes by voter deleted");
        Ok(deleted)
    }
}
