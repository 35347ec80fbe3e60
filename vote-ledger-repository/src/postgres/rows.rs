//! Row types decoded from the ledger tables.
use chrono::{DateTime, Utc};
use vote_ledger_shared::types::{Direction, EntityRef, TallyEntry, Vote};

use crate::errors::VoteRepositoryError;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct VoteRow {
    id: i64,
    voter_kind: String,
    voter_id: String,
    voteable_kind: String,
    voteable_id: String,
    direction: i16,
    points: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = VoteRepositoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Vote {
            id: row.id,
            voter: EntityRef {
                kind: row.voter_kind,
                id: row.voter_id,
            },
            voteable: EntityRef {
                kind: row.voteable_kind,
                id: row.voteable_id,
            },
            direction: Direction::from_i16(row.direction)
                .ok_or(VoteRepositoryError::InvalidDirection(row.direction))?,
            points: row.points,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TallyRow {
    voteable_kind: String,
    voteable_id: String,
    points: i64,
}

impl From<TallyRow> for TallyEntry {
    fn from(row: TallyRow) -> Self {
        TallyEntry {
            voteable: EntityRef {
                kind: row.voteable_kind,
                id: row.voteable_id,
            },
            points: row.points,
        }
    }
}
