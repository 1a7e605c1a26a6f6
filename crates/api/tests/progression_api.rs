//! Integration tests for the progression endpoints: activities, quests,
//! daily challenge, and leaderboard.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get_auth, post_auth, post_empty, seed_user, token_for};
use serde_json::json;
use sqlx::PgPool;
use stxry_db::repositories::ProgressRepo;

#[sqlx::test(migrations = "../db/migrations")]
async fn first_touch_creates_default_progress(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    let response = get_auth(common::build_test_app(pool), "/api/v1/progression", &token).await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["level"], 1);
    assert_eq!(json["data"]["total_xp"], 0);
    assert_eq!(json["data"]["next_level_xp"], 100);
    assert_eq!(json["data"]["streak_days"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn recording_activity_awards_xp_and_starts_streak(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    let response = post_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/activities",
        &token,
        json!({"kind": "chapter_read"}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["xp_awarded"], 10);
    assert_eq!(json["data"]["leveled_up"], false);
    assert_eq!(json["data"]["progress"]["total_xp"], 10);
    assert_eq!(json["data"]["progress"]["streak_days"], 1);
    assert_eq!(json["data"]["progress"]["statistics"]["chapters_completed"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn finishing_first_story_unlocks_achievement(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    let response = post_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/activities",
        &token,
        json!({"kind": "story_finished"}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    let unlocked: Vec<&str> = json["data"]["unlocked"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(unlocked.contains(&"achievement_first_story"));

    // The unlock's 25 XP reward is paid on top of the story's 50.
    assert_eq!(json["data"]["xp_awarded"], 50);
    assert_eq!(json["data"]["progress"]["total_xp"], 75);

    // Reporting the same milestone again must not re-unlock it.
    let response = post_auth(
        common::build_test_app(pool),
        "/api/v1/progression/activities",
        &token,
        json!({"kind": "story_finished"}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert!(json["data"]["unlocked"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reading_session_carries_minutes(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    let response = post_auth(
        common::build_test_app(pool),
        "/api/v1/progression/activities",
        &token,
        json!({"kind": "reading_session", "minutes": 42}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["progress"]["statistics"]["total_reading_time"], 42);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn daily_challenge_has_fixed_items(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/progression/daily-challenge",
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    // Level 1: no bonus yet.
    assert_eq!(json["data"]["bonus_multiplier"], 1.0);
    assert_eq!(items[0]["reward_xp"], 30);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quest_accept_and_complete_flow(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    // First Creation is offered to anyone with zero stories created.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/quests",
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    let offered: Vec<&str> = json["data"]["available"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert!(offered.contains(&"quest_first_creation"));

    let response = post_empty(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/quests/quest_first_creation/accept",
        &token,
    )
    .await;
    expect_json(response, StatusCode::OK).await;

    // Accepting twice conflicts.
    let response = post_empty(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/quests/quest_first_creation/accept",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Completing grants the quest's XP reward.
    let response = post_empty(
        common::build_test_app(pool.clone()),
        "/api/v1/progression/quests/quest_first_creation/complete",
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"]["xp_awarded"], 150);
    assert_eq!(json["data"]["progress"]["total_xp"], 150);

    // Completing again conflicts: the quest is no longer active.
    let response = post_empty(
        common::build_test_app(pool),
        "/api/v1/progression/quests/quest_first_creation/complete",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn accepting_unoffered_quest_is_rejected(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let token = token_for(user, "user");

    // Novice Reader requires 5 stories read; a fresh account has none.
    let response = post_empty(
        common::build_test_app(pool),
        "/api/v1/progression/quests/quest_novice_reader/accept",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn leaderboard_ranks_by_xp_with_shared_ranks(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let carol = seed_user(&pool, "carol").await;

    // alice and bob: one story each (50 XP plus the First Story unlock's
    // 25). carol: one choice (2 XP).
    for (user, kind) in [
        (alice, "story_finished"),
        (bob, "story_finished"),
        (carol, "choice_made"),
    ] {
        let token = token_for(user, "user");
        let response = post_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/progression/activities",
            &token,
            json!({"kind": kind}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let token = token_for(alice, "user");
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/progression/leaderboard?metric=xp",
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["score"], 75);
    assert_eq!(rows[1]["rank"], 1);
    assert_eq!(rows[1]["score"], 75);
    assert_eq!(rows[2]["rank"], 3);
    assert_eq!(rows[2]["score"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn leaderboard_cutoff_follows_requested_metric(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let carol = seed_user(&pool, "carol").await;

    // alice and bob lead on XP.
    for user in [alice, bob] {
        let token = token_for(user, "user");
        let response = post_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/progression/activities",
            &token,
            json!({"kind": "story_finished"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // carol holds the longest streak but no XP at all.
    let mut carol_progress = ProgressRepo::get_or_create(&pool, carol).await.unwrap();
    carol_progress.streak_days = 9;
    ProgressRepo::save(&pool, &carol_progress).await.unwrap();

    // With a cutoff smaller than the player count, the streak board must
    // still lead with the streak holder, not the XP leaders.
    let token = token_for(alice, "user");
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/progression/leaderboard?metric=streak&limit=2",
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["score"], 9);
    assert_eq!(rows[0]["player"]["user_id"], carol);
}
