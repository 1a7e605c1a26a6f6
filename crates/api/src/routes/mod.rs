pub mod global_story;
pub mod health;
pub mod progression;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /progression                                     progress snapshot (GET)
/// /progression/activities                          record activity (POST)
/// /progression/daily-challenge                     daily challenge (GET)
/// /progression/quests                              offers + player rows (GET)
/// /progression/quests/{id}/accept                  accept offer (POST)
/// /progression/quests/{id}/complete                complete + reward (POST)
/// /progression/leaderboard                         ranked players (GET)
///
/// /global-story                                    active story (GET), create (POST, admin)
/// /global-story/chapters                           chapters in order (GET)
/// /global-story/current                            open round + actions (GET)
/// /global-story/cooldown                           per-user eligibility (GET)
/// /global-story/actions                            submit action (POST)
/// /global-story/actions/{id}/vote                  vote (POST), unvote (DELETE)
/// /global-story/chapters/{id}/resolve              resolve round (POST, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/progression", progression::router())
        .nest("/global-story", global_story::router())
}
