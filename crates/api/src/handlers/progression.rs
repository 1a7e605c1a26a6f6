//! Handlers for player progression: XP, streaks, achievements, quests,
//! the daily challenge, and the leaderboard.
//!
//! All endpoints require authentication via [`RequireAuth`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stxry_core::challenge;
use stxry_core::error::CoreError;
use stxry_core::leaderboard::{self, LeaderboardMetric};
use stxry_core::progression::Activity;
use stxry_core::quests::{self, Quest};
use stxry_db::models::progress::PlayerQuestRow;
use stxry_db::repositories::ProgressRepo;

use crate::engine::progression as engine;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

/// DTO for recording a qualifying activity.
#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    #[serde(flatten)]
    pub activity: Activity,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub metric: Option<LeaderboardMetric>,
    pub limit: Option<i64>,
}

/// Quest listing: current offers plus the player's accepted/completed rows.
#[derive(Debug, Serialize)]
pub struct QuestsResponse {
    pub available: Vec<Quest>,
    pub quests: Vec<PlayerQuestRow>,
}

const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
const MAX_LEADERBOARD_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Progress endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/progression
///
/// The authenticated user's full progress snapshot (created on first touch).
pub async fn get_progression(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get_or_create(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/progression/activities
///
/// Record a qualifying activity: bumps the mapped statistic, awards XP,
/// updates the streak, and reports any new achievement unlocks.
pub async fn record_activity(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<RecordActivityRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = engine::record_activity(&state.pool, user.user_id, input.activity).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/progression/daily-challenge
///
/// The fixed daily challenge set with rewards scaled by the user's level.
pub async fn daily_challenge(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get_or_create(&state.pool, user.user_id).await?;
    let challenge = challenge::daily_challenge(progress.level);
    Ok(Json(DataResponse { data: challenge }))
}

// ---------------------------------------------------------------------------
// Quest endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/progression/quests
///
/// Quest offers the user can accept right now, plus their accepted and
/// completed quest rows.
pub async fn list_quests(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get_or_create(&state.pool, user.user_id).await?;
    let available = quests::available_quests(&progress, Utc::now());
    let rows = ProgressRepo::list_quests(&state.pool, user.user_id).await?;

    Ok(Json(DataResponse {
        data: QuestsResponse {
            available,
            quests: rows,
        },
    }))
}

/// POST /api/v1/progression/quests/{id}/accept
///
/// Accept a quest offer. The quest must currently be offered to this user.
pub async fn accept_quest(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(quest_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get_or_create(&state.pool, user.user_id).await?;
    let offer = quests::available_quests(&progress, Utc::now())
        .into_iter()
        .find(|q| q.id == quest_id)
        .ok_or_else(|| {
            AppError::BadRequest(format!("Quest '{quest_id}' is not available"))
        })?;

    let accepted =
        ProgressRepo::accept_quest(&state.pool, user.user_id, offer.id, offer.expires_at).await?;
    if !accepted {
        return Err(AppError::Core(CoreError::Conflict(
            "Quest already accepted".into(),
        )));
    }

    tracing::info!(user_id = user.user_id, quest_id = offer.id, "Quest accepted");
    Ok(Json(DataResponse { data: offer }))
}

/// POST /api/v1/progression/quests/{id}/complete
///
/// Complete an active quest and grant its XP reward.
pub async fn complete_quest(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(quest_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let reward = quests::reward_xp(&quest_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown quest '{quest_id}'")))?;

    let completed = ProgressRepo::complete_quest(&state.pool, user.user_id, &quest_id).await?;
    if !completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Quest is not active for this user".into(),
        )));
    }

    let outcome = engine::grant_xp(&state.pool, user.user_id, reward, &quest_id).await?;
    tracing::info!(
        user_id = user.user_id,
        quest_id = %quest_id,
        reward,
        "Quest completed"
    );
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// GET /api/v1/progression/leaderboard?metric=xp&limit=50
///
/// Ranked players under the chosen metric (default lifetime XP). Ties share
/// a rank; the next distinct score takes the position after them.
pub async fn leaderboard(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<impl IntoResponse> {
    let metric = query.metric.unwrap_or(LeaderboardMetric::Xp);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let players = ProgressRepo::list_for_leaderboard(&state.pool, metric, limit).await?;
    let ranked = leaderboard::rank_players(&players, metric);

    Ok(Json(DataResponse { data: ranked }).into_response())
}
