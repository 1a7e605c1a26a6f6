//! Repository for `player_progress`, `player_achievements`, and
//! `player_quests`.
//!
//! The engine computes new snapshots in `stxry-core`; this repository only
//! loads and stores them. Achievement unlocks and quest acceptance live in
//! their own append-only tables so the progress row itself stays a plain
//! update.

use sqlx::PgPool;
use stxry_core::leaderboard::LeaderboardMetric;
use stxry_core::progression::PlayerProgress;
use stxry_core::types::{DbId, Timestamp};

use crate::models::progress::{PlayerProgressRow, PlayerQuestRow};

/// Column list for `player_progress` queries.
const COLUMNS: &str = "id, user_id, level, current_xp, next_level_xp, total_xp, streak_days, \
    last_active_date, stories_read, stories_created, total_reading_time, chapters_completed, \
    choices_made, comments_posted, stories_rated, followers_gained, created_at, updated_at";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Load a user's progress snapshot, creating the default row on first
    /// touch (level 1, zero XP).
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<PlayerProgress, sqlx::Error> {
        sqlx::query("INSERT INTO player_progress (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM player_progress WHERE user_id = $1");
        let row = sqlx::query_as::<_, PlayerProgressRow>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        let achievements: Vec<String> = sqlx::query_scalar(
            "SELECT achievement_id FROM player_achievements WHERE user_id = $1 ORDER BY unlocked_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let active: Vec<String> = sqlx::query_scalar(
            "SELECT quest_id FROM player_quests WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let completed: Vec<String> = sqlx::query_scalar(
            "SELECT quest_id FROM player_quests WHERE user_id = $1 AND status = 'completed'",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(row.into_progress(achievements, active, completed))
    }

    /// Persist a computed snapshot's mutable fields.
    ///
    /// Unlocks and quest membership are written through
    /// [`Self::unlock_achievements`] / the quest methods, not here.
    pub async fn save(pool: &PgPool, progress: &PlayerProgress) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE player_progress SET \
                level = $2, current_xp = $3, next_level_xp = $4, total_xp = $5, \
                streak_days = $6, last_active_date = $7, \
                stories_read = $8, stories_created = $9, total_reading_time = $10, \
                chapters_completed = $11, choices_made = $12, comments_posted = $13, \
                stories_rated = $14, followers_gained = $15, \
                updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(progress.user_id)
        .bind(progress.level)
        .bind(progress.current_xp)
        .bind(progress.next_level_xp)
        .bind(progress.total_xp)
        .bind(progress.streak_days)
        .bind(progress.last_active_date)
        .bind(progress.statistics.stories_read)
        .bind(progress.statistics.stories_created)
        .bind(progress.statistics.total_reading_time)
        .bind(progress.statistics.chapters_completed)
        .bind(progress.statistics.choices_made)
        .bind(progress.statistics.comments_posted)
        .bind(progress.statistics.stories_rated)
        .bind(progress.statistics.followers_gained)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Merge newly unlocked achievement ids into the persisted set.
    /// Idempotent: already-unlocked ids are skipped by the unique key.
    pub async fn unlock_achievements(
        pool: &PgPool,
        user_id: DbId,
        achievement_ids: &[&str],
    ) -> Result<(), sqlx::Error> {
        for id in achievement_ids {
            sqlx::query(
                "INSERT INTO player_achievements (user_id, achievement_id) VALUES ($1, $2) \
                 ON CONFLICT ON CONSTRAINT uq_player_achievements_user_achievement DO NOTHING",
            )
            .bind(user_id)
            .bind(id)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    /// Load progress snapshots for ranking under the given metric.
    ///
    /// The ORDER BY must mirror the in-memory ranking sort key: with a
    /// LIMIT in play, ordering by anything else would cut off players who
    /// lead the requested metric but trail in lifetime XP.
    ///
    /// Unlock and quest lists are not loaded here; ranking only reads the
    /// level/XP/streak/counter fields.
    pub async fn list_for_leaderboard(
        pool: &PgPool,
        metric: LeaderboardMetric,
        limit: i64,
    ) -> Result<Vec<PlayerProgress>, sqlx::Error> {
        let order = match metric {
            LeaderboardMetric::Level => "level DESC, total_xp DESC",
            LeaderboardMetric::Xp => "total_xp DESC",
            LeaderboardMetric::Streak => "streak_days DESC",
            LeaderboardMetric::StoriesRead => "stories_read DESC",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM player_progress ORDER BY {order}, user_id ASC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, PlayerProgressRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| r.into_progress(Vec::new(), Vec::new(), Vec::new()))
            .collect())
    }

    // -- Quests --------------------------------------------------------

    /// Accept a quest offer. Returns `false` if the user already holds or
    /// completed this quest (no-op).
    pub async fn accept_quest(
        pool: &PgPool,
        user_id: DbId,
        quest_id: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO player_quests (user_id, quest_id, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_player_quests_user_quest DO NOTHING",
        )
        .bind(user_id)
        .bind(quest_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an active quest completed. Returns `false` if the quest was not
    /// active for this user.
    pub async fn complete_quest(
        pool: &PgPool,
        user_id: DbId,
        quest_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE player_quests SET status = 'completed', completed_at = NOW() \
             WHERE user_id = $1 AND quest_id = $2 AND status = 'active'",
        )
        .bind(user_id)
        .bind(quest_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All quest rows for a user.
    pub async fn list_quests(pool: &PgPool, user_id: DbId) -> Result<Vec<PlayerQuestRow>, sqlx::Error> {
        sqlx::query_as::<_, PlayerQuestRow>(
            "SELECT id, user_id, quest_id, status, accepted_at, completed_at, expires_at \
             FROM player_quests WHERE user_id = $1 ORDER BY accepted_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
