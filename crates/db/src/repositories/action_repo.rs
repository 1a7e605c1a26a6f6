//! Repository for `gs_actions`: submission and listing.
//!
//! Submission re-checks the cooldown inside the insert transaction, under a
//! row lock on the story: at READ COMMITTED the MAX(created_at) read cannot
//! see another submit's uncommitted row, so without the lock two submits
//! straddling a round resolution could land one action in each chapter.
//! Locking the story row first serializes same-story submits, and the
//! `uq_gs_actions_chapter_user` key backs up the one-action-per-chapter
//! rule. A replay that finds its row already present collapses to an
//! idempotent success (the surviving row is returned).

use chrono::Duration;
use sqlx::PgPool;
use stxry_core::global_story::{self, ActionKind, GlobalStoryError};
use stxry_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::global_story::{GlobalStoryAction, ViewedAction};

/// Column list for `gs_actions` queries.
const COLUMNS: &str =
    "id, chapter_id, user_id, action_type, action_text, vote_count, is_selected, created_at";

pub struct ActionRepo;

impl ActionRepo {
    /// Timestamp of the user's most recent action anywhere in the story
    /// (the cooldown is per story, not per chapter).
    pub async fn last_action_at(
        pool: &PgPool,
        story_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT MAX(a.created_at) FROM gs_actions a \
             JOIN gs_chapters c ON c.id = a.chapter_id \
             WHERE c.story_id = $1 AND a.user_id = $2",
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Actions for a chapter with the viewer-relative `has_user_voted`
    /// flag, ordered by vote count (winner-first display order).
    pub async fn list_for_chapter(
        pool: &PgPool,
        chapter_id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Vec<ViewedAction>, sqlx::Error> {
        sqlx::query_as::<_, ViewedAction>(
            "SELECT a.id, a.chapter_id, a.user_id, a.action_type, a.action_text, \
                    a.vote_count, a.is_selected, \
                    EXISTS(SELECT 1 FROM gs_votes v \
                           WHERE v.action_id = a.id AND v.user_id = $2) AS has_user_voted, \
                    a.created_at \
             FROM gs_actions a \
             WHERE a.chapter_id = $1 \
             ORDER BY a.vote_count DESC, a.created_at ASC, a.id ASC",
        )
        .bind(chapter_id)
        .bind(viewer_id)
        .fetch_all(pool)
        .await
    }

    /// Submit an action to a chapter's round.
    ///
    /// Inside one transaction: locks the story row, re-checks the cooldown
    /// server-side, verifies the round is still open, inserts the action,
    /// and bumps the story's contribution counters (`unique_contributors`
    /// only on the user's first action in the story). A replay that finds
    /// its row already present returns the surviving row unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit(
        pool: &PgPool,
        story_id: DbId,
        chapter_id: DbId,
        user_id: DbId,
        kind: ActionKind,
        action_text: &str,
        cooldown: Duration,
        now: Timestamp,
    ) -> Result<GlobalStoryAction, StoreError> {
        let mut tx = pool.begin().await?;

        // Serialize submits per story. The cooldown read below only sees
        // committed rows, so a concurrent submit straddling a resolution
        // could otherwise slip an action into both the old and new chapter.
        sqlx::query_scalar::<_, DbId>("SELECT id FROM global_stories WHERE id = $1 FOR UPDATE")
            .bind(story_id)
            .fetch_one(&mut *tx)
            .await?;

        // Cooldown re-check: never trust client-cached eligibility.
        let last: Option<Timestamp> = sqlx::query_scalar(
            "SELECT MAX(a.created_at) FROM gs_actions a \
             JOIN gs_chapters c ON c.id = a.chapter_id \
             WHERE c.story_id = $1 AND a.user_id = $2",
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let status = global_story::cooldown_status(last, now, cooldown);
        if !status.can_act {
            return Err(GlobalStoryError::CooldownActive {
                next_action_at: status.next_action_at.unwrap_or(now),
            }
            .into());
        }

        let open: Option<(bool, Timestamp)> = sqlx::query_as(
            "SELECT votes_tallied, voting_ends_at FROM gs_chapters \
             WHERE id = $1 AND story_id = $2",
        )
        .bind(chapter_id)
        .bind(story_id)
        .fetch_optional(&mut *tx)
        .await?;

        match open {
            None => return Err(sqlx::Error::RowNotFound.into()),
            Some((votes_tallied, voting_ends_at)) => {
                if votes_tallied || now > voting_ends_at {
                    return Err(GlobalStoryError::VotingClosed.into());
                }
            }
        }

        let first_in_story: bool = sqlx::query_scalar(
            "SELECT NOT EXISTS(SELECT 1 FROM gs_actions a \
                               JOIN gs_chapters c ON c.id = a.chapter_id \
                               WHERE c.story_id = $1 AND a.user_id = $2)",
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let insert_query = format!(
            "INSERT INTO gs_actions (chapter_id, user_id, action_type, action_text) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_gs_actions_chapter_user DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, GlobalStoryAction>(&insert_query)
            .bind(chapter_id)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(action_text)
            .fetch_optional(&mut *tx)
            .await?;

        let action = match inserted {
            Some(action) => {
                sqlx::query(
                    "UPDATE global_stories SET \
                        total_contributions = total_contributions + 1, \
                        unique_contributors = unique_contributors + CASE WHEN $2 THEN 1 ELSE 0 END \
                     WHERE id = $1",
                )
                .bind(story_id)
                .bind(first_in_story)
                .execute(&mut *tx)
                .await?;
                action
            }
            // Race loser: the user's row already exists for this chapter.
            // Indistinguishable from having succeeded first, so return it.
            None => {
                let existing_query = format!(
                    "SELECT {COLUMNS} FROM gs_actions WHERE chapter_id = $1 AND user_id = $2"
                );
                sqlx::query_as::<_, GlobalStoryAction>(&existing_query)
                    .bind(chapter_id)
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(action)
    }
}
