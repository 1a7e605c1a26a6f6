//! Transactional commit of a round resolution.
//!
//! The caller (the resolution engine) has already tallied the round,
//! selected the winner, and generated the next chapter's content. This
//! repository commits all of it atomically behind a conditional claim on
//! `votes_tallied`, so a concurrent resolver observes `AlreadyResolved`
//! and exits, and a generation failure upstream leaves nothing written.

use serde::Serialize;
use sqlx::PgPool;
use stxry_core::global_story::GlobalStoryError;
use stxry_core::types::DbId;

use crate::error::StoreError;
use crate::models::global_story::{GlobalStoryAction, GlobalStoryChapter, NewChapter};

const ACTION_COLUMNS: &str =
    "id, chapter_id, user_id, action_type, action_text, vote_count, is_selected, created_at";

const CHAPTER_COLUMNS: &str = "id, story_id, chapter_number, title, content, \
    ai_generated_choices, winning_action_text, votes_tallied, voting_ends_at, created_at";

/// Everything a committed resolution produced.
#[derive(Debug, Serialize)]
pub struct ResolvedRound {
    pub winning_action: GlobalStoryAction,
    pub new_chapter: GlobalStoryChapter,
}

pub struct ResolutionRepo;

impl ResolutionRepo {
    /// Commit a resolution: claim the chapter, mark the winner, record the
    /// winning text, and open the next chapter, all in one transaction.
    ///
    /// The claim is a conditional update of `votes_tallied` from false to
    /// true; losing the claim returns [`GlobalStoryError::AlreadyResolved`]
    /// with no changes, which callers treat as a no-op.
    pub async fn commit(
        pool: &PgPool,
        chapter_id: DbId,
        winning_action_id: DbId,
        next_chapter: &NewChapter,
    ) -> Result<ResolvedRound, StoreError> {
        let mut tx = pool.begin().await?;

        // Claim. Exactly one resolver can flip the flag.
        let claimed: Option<DbId> = sqlx::query_scalar(
            "UPDATE gs_chapters SET votes_tallied = TRUE \
             WHERE id = $1 AND votes_tallied = FALSE \
             RETURNING story_id",
        )
        .bind(chapter_id)
        .fetch_optional(&mut *tx)
        .await?;

        let story_id = match claimed {
            Some(story_id) => story_id,
            None => return Err(GlobalStoryError::AlreadyResolved.into()),
        };

        let winner_query = format!(
            "UPDATE gs_actions SET is_selected = TRUE \
             WHERE id = $1 AND chapter_id = $2 \
             RETURNING {ACTION_COLUMNS}"
        );
        let winning_action = sqlx::query_as::<_, GlobalStoryAction>(&winner_query)
            .bind(winning_action_id)
            .bind(chapter_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE gs_chapters SET winning_action_text = $2 WHERE id = $1")
            .bind(chapter_id)
            .bind(&winning_action.action_text)
            .execute(&mut *tx)
            .await?;

        let chapter_query = format!(
            "INSERT INTO gs_chapters \
                (story_id, chapter_number, title, content, ai_generated_choices, voting_ends_at) \
             VALUES ( \
                $1, \
                (SELECT COALESCE(MAX(chapter_number), 0) + 1 FROM gs_chapters WHERE story_id = $1), \
                $2, $3, $4, $5 \
             ) \
             RETURNING {CHAPTER_COLUMNS}"
        );
        let new_chapter = sqlx::query_as::<_, GlobalStoryChapter>(&chapter_query)
            .bind(story_id)
            .bind(&next_chapter.title)
            .bind(&next_chapter.content)
            .bind(serde_json::json!(next_chapter.choices))
            .bind(next_chapter.voting_ends_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            chapter_id,
            winning_action_id,
            new_chapter_id = new_chapter.id,
            "Round resolved"
        );

        Ok(ResolvedRound {
            winning_action,
            new_chapter,
        })
    }
}
