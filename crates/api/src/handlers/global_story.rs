//! Handlers for the Global Story: the single community-driven tale where
//! users submit actions and vote each round.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use stxry_core::error::CoreError;
use stxry_core::global_story::{self, ActionKind, COOLDOWN_HOURS};
use stxry_core::progression::Activity;
use stxry_core::types::DbId;
use stxry_db::models::global_story::{GlobalStory, GlobalStoryChapter, NewChapter, ViewedAction};
use stxry_db::repositories::{ActionRepo, StoryRepo, VoteRepo};

use crate::engine::progression as progression_engine;
use crate::engine::resolution;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

/// DTO for submitting an action to the current round.
#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    pub kind: ActionKind,
    /// Index into the chapter's preset choices (`kind = "preset_choice"`).
    pub preset_index: Option<usize>,
    /// Free-form action text (`kind = "custom_write"`).
    pub text: Option<String>,
}

/// DTO for creating a new global story (admin).
#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    pub title: String,
    pub description: String,
    pub first_chapter: FirstChapterRequest,
}

/// Opening chapter content for a new story.
#[derive(Debug, Deserialize)]
pub struct FirstChapterRequest {
    pub title: String,
    pub content: String,
    pub choices: Vec<String>,
}

/// The current round: the open chapter plus its actions as seen by the
/// requesting user.
#[derive(Debug, Serialize)]
pub struct CurrentRoundResponse {
    pub story: GlobalStory,
    pub chapter: GlobalStoryChapter,
    pub actions: Vec<ViewedAction>,
}

/// What submitting an action produced: the stored action plus the XP award
/// for participating.
#[derive(Debug, Serialize)]
pub struct SubmitActionResponse {
    pub action: stxry_db::models::global_story::GlobalStoryAction,
    pub xp_awarded: i64,
}

/// Updated tally after a vote or unvote.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub action_id: DbId,
    pub vote_count: i64,
}

fn cooldown_window() -> Duration {
    Duration::hours(COOLDOWN_HOURS)
}

/// The active story, or 404 when none is running.
async fn require_active_story(state: &AppState) -> AppResult<GlobalStory> {
    StoryRepo::find_active(&state.pool).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "global_story",
            id: 0,
        })
    })
}

/// The active story's open chapter, or 404 when the story is finished.
async fn require_open_chapter(
    state: &AppState,
    story: &GlobalStory,
) -> AppResult<GlobalStoryChapter> {
    StoryRepo::current_open_chapter(&state.pool, story.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "open_chapter",
                id: story.id,
            })
        })
}

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/global-story
///
/// The active story's metadata and contribution counters.
pub async fn get_story(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let story = require_active_story(&state).await?;
    Ok(Json(DataResponse { data: story }))
}

/// GET /api/v1/global-story/chapters
///
/// All chapters of the active story in reading order.
pub async fn list_chapters(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let story = require_active_story(&state).await?;
    let chapters = StoryRepo::list_chapters(&state.pool, story.id).await?;
    Ok(Json(DataResponse { data: chapters }))
}

/// GET /api/v1/global-story/current
///
/// The open chapter and its submitted actions, with the viewer-relative
/// `has_user_voted` flag.
pub async fn current_round(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let story = require_active_story(&state).await?;
    let chapter = require_open_chapter(&state, &story).await?;
    let actions =
        ActionRepo::list_for_chapter(&state.pool, chapter.id, Some(user.user_id)).await?;

    Ok(Json(DataResponse {
        data: CurrentRoundResponse {
            story,
            chapter,
            actions,
        },
    }))
}

/// GET /api/v1/global-story/cooldown
///
/// Whether the user may act in the current round, and if not, when.
pub async fn cooldown(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let story = require_active_story(&state).await?;
    let last = ActionRepo::last_action_at(&state.pool, story.id, user.user_id).await?;
    let status = global_story::cooldown_status(last, Utc::now(), cooldown_window());
    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Write endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/global-story/actions
///
/// Submit an action to the current round. Preset choices are re-derived
/// from the chapter's generated options by index; custom text is validated
/// for length. Participation earns XP.
pub async fn submit_action(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<SubmitActionRequest>,
) -> AppResult<impl IntoResponse> {
    let story = require_active_story(&state).await?;
    let chapter = require_open_chapter(&state, &story).await?;

    let action_text = global_story::resolve_action_text(
        input.kind,
        input.text.as_deref(),
        &chapter.preset_choices(),
        input.preset_index,
    )?;

    let action = ActionRepo::submit(
        &state.pool,
        story.id,
        chapter.id,
        user.user_id,
        input.kind,
        &action_text,
        cooldown_window(),
        Utc::now(),
    )
    .await?;

    let outcome = progression_engine::record_activity(
        &state.pool,
        user.user_id,
        Activity::GlobalStoryAction,
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        story_id = story.id,
        chapter_id = chapter.id,
        action_id = action.id,
        kind = input.kind.as_str(),
        "Global story action submitted"
    );

    Ok(Json(DataResponse {
        data: SubmitActionResponse {
            action,
            xp_awarded: outcome.xp_awarded,
        },
    }))
}

/// POST /api/v1/global-story/actions/{id}/vote
///
/// Vote for an action. Voting twice is a no-op; voting for your own action
/// is rejected.
pub async fn vote(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(action_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vote_count = VoteRepo::vote(&state.pool, action_id, user.user_id, Utc::now()).await?;
    Ok(Json(DataResponse {
        data: VoteResponse {
            action_id,
            vote_count,
        },
    }))
}

/// DELETE /api/v1/global-story/actions/{id}/vote
///
/// Withdraw a vote. Unvoting without an existing vote is a no-op.
pub async fn unvote(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(action_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vote_count = VoteRepo::unvote(&state.pool, action_id, user.user_id, Utc::now()).await?;
    Ok(Json(DataResponse {
        data: VoteResponse {
            action_id,
            vote_count,
        },
    }))
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/global-story (admin)
///
/// Start a new global story with its opening chapter. Rejected with 409
/// while another story is active.
pub async fn create_story(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    let first_chapter = NewChapter {
        title: input.first_chapter.title,
        content: input.first_chapter.content,
        choices: input.first_chapter.choices,
        voting_ends_at: Utc::now() + state.config.round_duration(),
    };

    let (story, chapter) = StoryRepo::create_with_first_chapter(
        &state.pool,
        &input.title,
        &input.description,
        &first_chapter,
    )
    .await?;

    tracing::info!(
        admin_id = user.user_id,
        story_id = story.id,
        "Global story created"
    );

    Ok(Json(DataResponse {
        data: CurrentRoundResponse {
            story,
            chapter,
            actions: Vec::new(),
        },
    }))
}

/// POST /api/v1/global-story/chapters/{id}/resolve (admin)
///
/// Resolve a round immediately instead of waiting for the background
/// resolver. Safe to race with it: the losing trigger observes 409.
pub async fn resolve_chapter(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(chapter_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let resolved = resolution::resolve_chapter(
        &state.pool,
        state.generator.as_ref(),
        chapter_id,
        state.config.round_duration(),
    )
    .await?;

    tracing::info!(admin_id = user.user_id, chapter_id, "Round resolved by admin");
    Ok(Json(DataResponse { data: resolved }))
}
