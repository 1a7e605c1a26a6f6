//! Route definitions for player progression.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progression;
use crate::state::AppState;

/// Routes mounted at `/progression`.
///
/// ```text
/// GET    /                        -> get_progression
/// POST   /activities              -> record_activity
/// GET    /daily-challenge         -> daily_challenge
/// GET    /quests                  -> list_quests
/// POST   /quests/{id}/accept      -> accept_quest
/// POST   /quests/{id}/complete    -> complete_quest
/// GET    /leaderboard             -> leaderboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(progression::get_progression))
        .route("/activities", post(progression::record_activity))
        .route("/daily-challenge", get(progression::daily_challenge))
        .route("/quests", get(progression::list_quests))
        .route("/quests/{id}/accept", post(progression::accept_quest))
        .route("/quests/{id}/complete", post(progression::complete_quest))
        .route("/leaderboard", get(progression::leaderboard))
}
