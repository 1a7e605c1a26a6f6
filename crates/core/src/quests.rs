//! Quest offering rules.
//!
//! Quests are offered dynamically from a hardcoded gating table rather than
//! persisted as catalog rows; a quest is available iff its gating condition
//! holds and the user has not already accepted or completed it.

use chrono::{Datelike, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::progression::PlayerProgress;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Daily,
    Weekly,
    Story,
    Special,
}

/// One counter a quest tracks toward completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestObjective {
    pub description: &'static str,
    pub current: i64,
    pub target: i64,
    pub completed: bool,
}

impl QuestObjective {
    fn new(description: &'static str, target: i64) -> Self {
        Self {
            description,
            current: 0,
            target,
            completed: false,
        }
    }
}

/// A quest offer. `expires_at` is set only for time-boxed quest types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub id: &'static str,
    pub title: &'static str,
    pub quest_type: QuestType,
    pub objectives: Vec<QuestObjective>,
    pub reward_xp: i64,
    pub expires_at: Option<Timestamp>,
}

pub const QUEST_NOVICE_READER: &str = "quest_novice_reader";
pub const QUEST_FIRST_CREATION: &str = "quest_first_creation";
pub const QUEST_SOCIAL_BUTTERFLY: &str = "quest_social_butterfly";

/// XP reward for completing a quest. `None` for unknown ids.
///
/// Kept separate from [`available_quests`] because completion happens after
/// the gating condition may have stopped holding (completing First Creation
/// means `stories_created` is no longer zero).
pub fn reward_xp(quest_id: &str) -> Option<i64> {
    match quest_id {
        QUEST_NOVICE_READER => Some(200),
        QUEST_FIRST_CREATION => Some(150),
        QUEST_SOCIAL_BUTTERFLY => Some(100),
        _ => None,
    }
}

/// End of the current week: Sunday 23:59:59.999 UTC.
pub fn end_of_week(now: Timestamp) -> Timestamp {
    let days_to_sunday = 6 - i64::from(now.date_naive().weekday().num_days_from_monday());
    let sunday = now.date_naive() + chrono::Duration::days(days_to_sunday);
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();
    Utc.from_utc_datetime(&sunday.and_time(end))
}

/// Quests currently offerable to a player.
///
/// Gating rules:
/// - Novice Reader: `5 <= stories_read < 10`
/// - First Creation: `stories_created == 0`
/// - Social Butterfly: weekly, always offered, expires at end of week
///
/// Quests already in `active_quests` or `completed_quests` are excluded.
pub fn available_quests(progress: &PlayerProgress, now: Timestamp) -> Vec<Quest> {
    let mut offers = Vec::new();

    if (5..10).contains(&progress.statistics.stories_read) {
        offers.push(Quest {
            id: QUEST_NOVICE_READER,
            title: "Novice Reader",
            quest_type: QuestType::Story,
            objectives: vec![QuestObjective::new("Read 10 stories", 10)],
            reward_xp: 200,
            expires_at: None,
        });
    }

    if progress.statistics.stories_created == 0 {
        offers.push(Quest {
            id: QUEST_FIRST_CREATION,
            title: "First Creation",
            quest_type: QuestType::Special,
            objectives: vec![QuestObjective::new("Create your first story", 1)],
            reward_xp: 150,
            expires_at: None,
        });
    }

    offers.push(Quest {
        id: QUEST_SOCIAL_BUTTERFLY,
        title: "Social Butterfly",
        quest_type: QuestType::Weekly,
        objectives: vec![
            QuestObjective::new("Post 5 comments", 5),
            QuestObjective::new("Rate 3 stories", 3),
        ],
        reward_xp: 100,
        expires_at: Some(end_of_week(now)),
    });

    offers.retain(|q| {
        !progress.active_quests.iter().any(|id| id == q.id)
            && !progress.completed_quests.iter().any(|id| id == q.id)
    });

    offers
}
