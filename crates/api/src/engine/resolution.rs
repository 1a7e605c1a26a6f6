//! Round resolution orchestration.
//!
//! Resolution runs in three phases: tally (read actions, pick the winner),
//! generate (call the narrative service), commit (one transaction via
//! [`ResolutionRepo`]). Generation happens before the transaction so a slow
//! or failing service holds no database locks; the vote tally cannot drift
//! in between because votes are rejected once the deadline passes.
//!
//! Called from both the admin endpoint and the background resolver; the
//! conditional claim inside the commit makes concurrent triggers safe.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stxry_core::error::CoreError;
use stxry_core::global_story::{self, ActionTally, GlobalStoryError};
use stxry_core::types::DbId;
use stxry_db::models::global_story::NewChapter;
use stxry_db::repositories::{ActionRepo, ResolutionRepo, ResolvedRound, StoryRepo};
use stxry_narrative::{ContinuationGenerator, ContinuationRequest};

use crate::error::{AppError, AppResult};

/// Resolve a chapter's round: pick the winner, generate the continuation,
/// and commit winner plus next chapter atomically.
///
/// Fails with [`GlobalStoryError::AlreadyResolved`] if another resolver got
/// there first and [`GlobalStoryError::NoSubmissions`] for an empty round
/// (both no-ops). A generation failure aborts with nothing written.
pub async fn resolve_chapter(
    pool: &PgPool,
    generator: &dyn ContinuationGenerator,
    chapter_id: DbId,
    round_duration: Duration,
) -> AppResult<ResolvedRound> {
    let chapter = StoryRepo::find_chapter(pool, chapter_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "chapter",
                id: chapter_id,
            })
        })?;

    if chapter.votes_tallied {
        return Err(GlobalStoryError::AlreadyResolved.into());
    }

    let actions = ActionRepo::list_for_chapter(pool, chapter_id, None).await?;
    let tallies: Vec<ActionTally> = actions
        .iter()
        .map(|a| ActionTally {
            id: a.id,
            vote_count: a.vote_count,
            created_at: a.created_at,
        })
        .collect();

    let winner_id =
        global_story::select_winner(&tallies).ok_or(GlobalStoryError::NoSubmissions)?;
    let winner = actions
        .iter()
        .find(|a| a.id == winner_id)
        .ok_or_else(|| AppError::InternalError("winning action missing from tally".into()))?;

    let story = StoryRepo::find(pool, chapter.story_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "global_story",
            id: chapter.story_id,
        })
    })?;

    let continuation = generator
        .generate(&ContinuationRequest {
            story_title: story.title.clone(),
            previous_content: chapter.content.clone(),
            winning_action: winner.action_text.clone(),
            next_chapter_number: chapter.chapter_number + 1,
        })
        .await?;

    let next_chapter = NewChapter {
        title: continuation.title,
        content: continuation.content,
        choices: continuation.choices,
        voting_ends_at: Utc::now() + round_duration,
    };

    let resolved = ResolutionRepo::commit(pool, chapter_id, winner_id, &next_chapter).await?;

    tracing::info!(
        story_id = story.id,
        chapter_id,
        winner_id,
        votes = winner.vote_count,
        "Chapter resolved, next round open"
    );

    Ok(resolved)
}
