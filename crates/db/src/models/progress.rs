//! Player progression rows and conversions to the domain snapshot.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use stxry_core::progression::{PlayerProgress, PlayerStatistics};
use stxry_core::types::{DbId, Timestamp};

/// A row from the `player_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerProgressRow {
    pub id: DbId,
    pub user_id: DbId,
    pub level: i32,
    pub current_xp: i64,
    pub next_level_xp: i64,
    pub total_xp: i64,
    pub streak_days: i32,
    pub last_active_date: Option<NaiveDate>,
    pub stories_read: i64,
    pub stories_created: i64,
    pub total_reading_time: i64,
    pub chapters_completed: i64,
    pub choices_made: i64,
    pub comments_posted: i64,
    pub stories_rated: i64,
    pub followers_gained: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlayerProgressRow {
    /// Assemble the domain snapshot from this row plus the user's unlock
    /// and quest id lists (stored in their own tables).
    pub fn into_progress(
        self,
        achievements_unlocked: Vec<String>,
        active_quests: Vec<String>,
        completed_quests: Vec<String>,
    ) -> PlayerProgress {
        PlayerProgress {
            user_id: self.user_id,
            level: self.level,
            current_xp: self.current_xp,
            next_level_xp: self.next_level_xp,
            total_xp: self.total_xp,
            streak_days: self.streak_days,
            last_active_date: self.last_active_date,
            achievements_unlocked,
            active_quests,
            completed_quests,
            statistics: PlayerStatistics {
                stories_read: self.stories_read,
                stories_created: self.stories_created,
                total_reading_time: self.total_reading_time,
                chapters_completed: self.chapters_completed,
                choices_made: self.choices_made,
                comments_posted: self.comments_posted,
                stories_rated: self.stories_rated,
                followers_gained: self.followers_gained,
            },
        }
    }
}

/// A row from the `player_quests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerQuestRow {
    pub id: DbId,
    pub user_id: DbId,
    pub quest_id: String,
    pub status: String,
    pub accepted_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}
