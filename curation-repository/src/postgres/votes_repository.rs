//! PostgreSQL implementation of the vote repository.
//!
//! Every cast runs in one transaction that locks the target row before reading
//! the voter's current vote, so casts on the same target serialize and the
//! ledger write and counter delta commit or roll back together. Dropping the
//! future mid-cast drops the transaction, which rolls back.
//!
//! ## Database Tables
//!
//! - `votes`: one row per (voter, target, kind), the source of truth
//! - `websites` / `comments`: votable entities carrying `upvotes` and `downvotes`
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curation_shared::types::{
    CounterDrift, TargetId, TargetKind, UserId, Vote, VoteDirection, VoteOutcome, VoteTransition,
    VotesCount, VotesDelta,
};
use sqlx::Row;
use tracing::debug;

use crate::{VoteRepository, VoteRepositoryError};

type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// PostgreSQL implementation of the vote repository.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

fn direction_code(direction: VoteDirection) -> i16 {
    match direction {
        VoteDirection::Upvote => 0,
        VoteDirection::Downvote => 1,
    }
}

fn direction_from_code(code: i16) -> Result<VoteDirection, VoteRepositoryError> {
    match code {
        0 => Ok(VoteDirection::Upvote),
        1 => Ok(VoteDirection::Downvote),
        _ => Err(VoteRepositoryError::InvalidVoteType(code)),
    }
}

fn kind_code(kind: TargetKind) -> i16 {
    match kind {
        TargetKind::Website => 0,
        TargetKind::Comment => 1,
    }
}

fn kind_from_code(code: i16) -> Result<TargetKind, VoteRepositoryError> {
    match code {
        0 => Ok(TargetKind::Website),
        1 => Ok(TargetKind::Comment),
        _ => Err(VoteRepositoryError::InvalidTargetKind(code)),
    }
}

/// Table holding the counters for `kind`. Never built from caller input.
fn target_table(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Website => "websites",
        TargetKind::Comment => "comments",
    }
}

impl PostgresVoteRepository {
    /// Creates a new PostgreSQL vote repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the migrated schema
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteRepositoryError> {
        Ok(Self { pool })
    }

    /// Locks the target row for the rest of the transaction and returns its counters.
    async fn lock_target_tx(
        &self,
        kind: TargetKind,
        target_id: TargetId,
        tx: &mut PgTransaction<'_>,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let query = format!(
            "SELECT upvotes, downvotes FROM {} WHERE id = $1 FOR UPDATE",
            target_table(kind)
        );
        let row = sqlx::query(&query)
            .bind(target_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(VoteRepositoryError::TargetNotFound {
                kind,
                id: target_id,
            })?;

        Ok(VotesCount::new(
            target_id,
            kind,
            row.try_get("upvotes")?,
            row.try_get("downvotes")?,
        ))
    }

    async fn find_vote_tx(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        tx: &mut PgTransaction<'_>,
    ) -> Result<Option<VoteDirection>, VoteRepositoryError> {
        let code: Option<i16> = sqlx::query_scalar(
            "SELECT direction FROM votes WHERE voter_id = $1 AND target_id = $2 AND target_kind = $3",
        )
        .bind(voter_id)
        .bind(target_id)
        .bind(kind_code(kind))
        .fetch_optional(&mut **tx)
        .await?;

        code.map(direction_from_code).transpose()
    }

    /// Applies the ledger side of a transition within an active transaction.
    async fn apply_transition_tx(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        transition: VoteTransition,
        tx: &mut PgTransaction<'_>,
    ) -> Result<(), VoteRepositoryError> {
        match transition {
            VoteTransition::Create(direction) => {
                sqlx::query(
                    r#"
                    INSERT INTO votes (voter_id, target_id, target_kind, direction, voted_at)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(voter_id)
                .bind(target_id)
                .bind(kind_code(kind))
                .bind(direction_code(direction))
                .bind(Utc::now())
                .execute(&mut **tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                        VoteRepositoryError::DuplicateVote {
                            voter_id,
                            target_id,
                            kind,
                        }
                    }
                    other => VoteRepositoryError::DatabaseError(other),
                })?;
            }
            VoteTransition::Remove(_) => {
                sqlx::query(
                    "DELETE FROM votes WHERE voter_id = $1 AND target_id = $2 AND target_kind = $3",
                )
                .bind(voter_id)
                .bind(target_id)
                .bind(kind_code(kind))
                .execute(&mut **tx)
                .await?;
            }
            VoteTransition::Switch { to, .. } => {
                sqlx::query(
                    r#"
                    UPDATE votes SET direction = $4, voted_at = $5
                    WHERE voter_id = $1 AND target_id = $2 AND target_kind = $3
                    "#,
                )
                .bind(voter_id)
                .bind(target_id)
                .bind(kind_code(kind))
                .bind(direction_code(to))
                .bind(Utc::now())
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }

    /// Moves the target's counters by `delta`, flooring at zero, and returns the new values.
    async fn apply_delta_tx(
        &self,
        kind: TargetKind,
        target_id: TargetId,
        delta: VotesDelta,
        tx: &mut PgTransaction<'_>,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let query = format!(
            r#"
            UPDATE {}
            SET upvotes = GREATEST(upvotes + $2, 0),
                downvotes = GREATEST(downvotes + $3, 0)
            WHERE id = $1
            RETURNING upvotes, downvotes
            "#,
            target_table(kind)
        );
        let row = sqlx::query(&query)
            .bind(target_id)
            .bind(delta.upvotes)
            .bind(delta.downvotes)
            .fetch_one(&mut **tx)
            .await?;

        Ok(VotesCount::new(
            target_id,
            kind,
            row.try_get("upvotes")?,
            row.try_get("downvotes")?,
        ))
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn cast_vote(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;

        self.lock_target_tx(kind, target_id, &mut tx).await?;
        let existing = self.find_vote_tx(voter_id, target_id, kind, &mut tx).await?;
        let transition = VoteTransition::plan(existing, direction);

        self.apply_transition_tx(voter_id, target_id, kind, transition, &mut tx)
            .await?;
        let count = self
            .apply_delta_tx(kind, target_id, transition.delta(), &mut tx)
            .await?;

        tx.commit().await?;

        debug!(
            voter_id = %voter_id,
            target_id = %target_id,
            kind = %kind,
            transition = ?transition,
            "Vote cast"
        );
        Ok(count.outcome(transition.resulting_vote()))
    }

    /// Uses `= ANY($3)` so the whole batch is a single query.
    async fn get_user_votes(
        &self,
        voter_id: UserId,
        kind: TargetKind,
        target_ids: &[TargetId],
    ) -> Result<Vec<Vote>, VoteRepositoryError> {
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT voter_id, target_id, target_kind, direction, voted_at
            FROM votes
            WHERE voter_id = $1 AND target_kind = $2 AND target_id = ANY($3)
            "#,
        )
        .bind(voter_id)
        .bind(kind_code(kind))
        .bind(target_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut votes = Vec::with_capacity(rows.len());
        for row in rows {
            votes.push(Vote {
                voter_id: row.try_get("voter_id")?,
                target_id: row.try_get("target_id")?,
                target_kind: kind_from_code(row.try_get("target_kind")?)?,
                direction: direction_from_code(row.try_get("direction")?)?,
                voted_at: row.try_get::<DateTime<Utc>, _>("voted_at")?,
            });
        }
        Ok(votes)
    }

    async fn get_votes_count(
        &self,
        kind: TargetKind,
        target_id: TargetId,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let query = format!(
            "SELECT upvotes, downvotes FROM {} WHERE id = $1",
            target_table(kind)
        );
        let row = sqlx::query(&query)
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(VoteRepositoryError::TargetNotFound {
                kind,
                id: target_id,
            })?;

        Ok(VotesCount::new(
            target_id,
            kind,
            row.try_get("upvotes")?,
            row.try_get("downvotes")?,
        ))
    }

    async fn find_counter_drift(
        &self,
        kind: TargetKind,
    ) -> Result<Vec<CounterDrift>, VoteRepositoryError> {
        let query = format!(
            r#"
            SELECT t.id, t.upvotes, t.downvotes,
                   COUNT(v.direction) FILTER (WHERE v.direction = 0) AS ledger_upvotes,
                   COUNT(v.direction) FILTER (WHERE v.direction = 1) AS ledger_downvotes
            FROM {} t
            LEFT JOIN votes v ON v.target_id = t.id AND v.target_kind = $1
            GROUP BY t.id, t.upvotes, t.downvotes
            HAVING t.upvotes <> COUNT(v.direction) FILTER (WHERE v.direction = 0)
                OR t.downvotes <> COUNT(v.direction) FILTER (WHERE v.direction = 1)
            ORDER BY t.id
            "#,
            target_table(kind)
        );
        let rows = sqlx::query(&query)
            .bind(kind_code(kind))
            .fetch_all(&self.pool)
            .await?;

        let mut drifts = Vec::with_capacity(rows.len());
        for row in rows {
            let target_id: TargetId = row.try_get("id")?;
            drifts.push(CounterDrift {
                stored: VotesCount::new(
                    target_id,
                    kind,
                    row.try_get("upvotes")?,
                    row.try_get("downvotes")?,
                ),
                expected: VotesCount::new(
                    target_id,
                    kind,
                    row.try_get("ledger_upvotes")?,
                    row.try_get("ledger_downvotes")?,
                ),
            });
        }
        Ok(drifts)
    }

    async fn repair_counter_drift(
        &self,
        drifts: &[CounterDrift],
    ) -> Result<Vec<VotesCount>, VoteRepositoryError> {
        if drifts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut repaired = Vec::with_capacity(drifts.len());
        for drift in drifts {
            let kind = drift.stored.target_kind;
            let target_id = drift.stored.target_id;

            // Same row lock as cast_vote: once held, no cast on this target is
            // in flight and the counts below include every committed vote.
            match self.lock_target_tx(kind, target_id, &mut tx).await {
                Ok(_) => {}
                Err(VoteRepositoryError::TargetNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }

            let query = format!(
                r#"
                UPDATE {}
                SET upvotes = (
                        SELECT COUNT(*) FROM votes
                        WHERE target_id = $1 AND target_kind = $2 AND direction = 0
                    ),
                    downvotes = (
                        SELECT COUNT(*) FROM votes
                        WHERE target_id = $1 AND target_kind = $2 AND direction = 1
                    )
                WHERE id = $1
                RETURNING upvotes, downvotes
                "#,
                target_table(kind)
            );
            let row = sqlx::query(&query)
                .bind(target_id)
                .bind(kind_code(kind))
                .fetch_one(&mut *tx)
                .await?;

            repaired.push(VotesCount::new(
                target_id,
                kind,
                row.try_get("upvotes")?,
                row.try_get("downvotes")?,
            ));
        }
        tx.commit().await?;
        Ok(repaired)
    }

    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError> {
        for table in ["votes", "websites", "comments"] {
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
}
