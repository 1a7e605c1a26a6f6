//! Route definitions for the Global Story.
//!
//! All endpoints require authentication; story creation and manual round
//! resolution additionally require the admin role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::global_story;
use crate::state::AppState;

/// Routes mounted at `/global-story`.
///
/// ```text
/// GET    /                         -> get_story
/// POST   /                         -> create_story (admin)
/// GET    /chapters                 -> list_chapters
/// GET    /current                  -> current_round
/// GET    /cooldown                 -> cooldown
/// POST   /actions                  -> submit_action
/// POST   /actions/{id}/vote        -> vote
/// DELETE /actions/{id}/vote        -> unvote
/// POST   /chapters/{id}/resolve    -> resolve_chapter (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(global_story::get_story).post(global_story::create_story),
        )
        .route("/chapters", get(global_story::list_chapters))
        .route("/current", get(global_story::current_round))
        .route("/cooldown", get(global_story::cooldown))
        .route("/actions", post(global_story::submit_action))
        .route(
            "/actions/{id}/vote",
            post(global_story::vote).delete(global_story::unvote),
        )
        .route("/chapters/{id}/resolve", post(global_story::resolve_chapter))
}
