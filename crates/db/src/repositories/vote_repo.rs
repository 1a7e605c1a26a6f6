//! Repository for `gs_votes`: the vote/unvote toggle.
//!
//! At most one vote per (user, action) is enforced by
//! `uq_gs_votes_action_user`; `vote_count` is maintained in the same
//! transaction as the vote row so concurrent toggles converge. Duplicate
//! votes and unvotes of a non-existent vote collapse to no-op successes.

use sqlx::PgPool;
use stxry_core::global_story::GlobalStoryError;
use stxry_core::types::{DbId, Timestamp};

use crate::error::StoreError;

/// Action fields the vote checks need.
#[derive(Debug, sqlx::FromRow)]
struct VoteTarget {
    author_id: DbId,
    votes_tallied: bool,
    voting_ends_at: Timestamp,
}

pub struct VoteRepo;

impl VoteRepo {
    async fn load_target(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        action_id: DbId,
    ) -> Result<VoteTarget, StoreError> {
        let target: Option<VoteTarget> = sqlx::query_as(
            "SELECT a.user_id AS author_id, c.votes_tallied, c.voting_ends_at \
             FROM gs_actions a JOIN gs_chapters c ON c.id = a.chapter_id \
             WHERE a.id = $1",
        )
        .bind(action_id)
        .fetch_optional(&mut **tx)
        .await?;
        target.ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    /// Cast a vote. Returns the action's new vote count.
    ///
    /// Fails with [`GlobalStoryError::SelfVoteForbidden`] for the action's
    /// author and [`GlobalStoryError::VotingClosed`] once the round is
    /// tallied or past its deadline. Voting twice is a no-op returning the
    /// unchanged count.
    pub async fn vote(
        pool: &PgPool,
        action_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<i64, StoreError> {
        let mut tx = pool.begin().await?;

        let target = Self::load_target(&mut tx, action_id).await?;
        if target.author_id == user_id {
            return Err(GlobalStoryError::SelfVoteForbidden.into());
        }
        if target.votes_tallied || now > target.voting_ends_at {
            return Err(GlobalStoryError::VotingClosed.into());
        }

        let inserted = sqlx::query(
            "INSERT INTO gs_votes (action_id, user_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_gs_votes_action_user DO NOTHING",
        )
        .bind(action_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let count: i64 = if inserted.rows_affected() > 0 {
            sqlx::query_scalar(
                "UPDATE gs_actions SET vote_count = vote_count + 1 \
                 WHERE id = $1 RETURNING vote_count",
            )
            .bind(action_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar("SELECT vote_count FROM gs_actions WHERE id = $1")
                .bind(action_id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;
        Ok(count)
    }

    /// Withdraw a vote. Returns the action's new vote count. Unvoting
    /// without an existing vote is a no-op returning the unchanged count.
    pub async fn unvote(
        pool: &PgPool,
        action_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<i64, StoreError> {
        let mut tx = pool.begin().await?;

        let target = Self::load_target(&mut tx, action_id).await?;
        if target.votes_tallied || now > target.voting_ends_at {
            return Err(GlobalStoryError::VotingClosed.into());
        }

        let deleted = sqlx::query("DELETE FROM gs_votes WHERE action_id = $1 AND user_id = $2")
            .bind(action_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let count: i64 = if deleted.rows_affected() > 0 {
            sqlx::query_scalar(
                "UPDATE gs_actions SET vote_count = vote_count - 1 \
                 WHERE id = $1 RETURNING vote_count",
            )
            .bind(action_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar("SELECT vote_count FROM gs_actions WHERE id = $1")
                .bind(action_id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;
        Ok(count)
    }
}
