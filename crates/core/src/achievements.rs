//! Achievement catalog and unlock evaluation.
//!
//! The catalog is a static data table separate from the evaluation logic,
//! so new achievements can be added without touching the unlock-checking
//! code path. Unlock status lives on [`PlayerProgress`]; this module only
//! computes which achievements newly qualify.

use serde::Serialize;

use crate::progression::PlayerProgress;

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Reader,
    Creator,
    Social,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// A typed reward granted on unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Reward {
    Xp(i64),
    Badge(&'static str),
    Title(&'static str),
}

/// An immutable catalog entry. The requirement is a named metric plus a
/// numeric target evaluated against the player's progress snapshot.
#[derive(Debug, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub rarity: Rarity,
    /// Metric name dispatched by [`metric_value`].
    pub metric: &'static str,
    pub target: i64,
    pub rewards: &'static [Reward],
    /// Hidden from listings until unlocked.
    pub secret: bool,
}

// ---------------------------------------------------------------------------
// Metric names
// ---------------------------------------------------------------------------

pub const METRIC_STORIES_READ: &str = "stories_read";
pub const METRIC_STORIES_CREATED: &str = "stories_created";
pub const METRIC_LEVEL: &str = "level";
pub const METRIC_STREAK_DAYS: &str = "streak_days";
pub const METRIC_COMMENTS_POSTED: &str = "comments_posted";
pub const METRIC_TOTAL_READING_TIME: &str = "total_reading_time";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The static achievement catalog, ordered by category then target.
pub const CATALOG: &[Achievement] = &[
    Achievement {
        id: "achievement_first_story",
        name: "First Story",
        category: Category::Reader,
        rarity: Rarity::Common,
        metric: METRIC_STORIES_READ,
        target: 1,
        rewards: &[Reward::Xp(25)],
        secret: false,
    },
    Achievement {
        id: "achievement_bookworm",
        name: "Bookworm",
        category: Category::Reader,
        rarity: Rarity::Rare,
        metric: METRIC_STORIES_READ,
        target: 50,
        rewards: &[Reward::Xp(250), Reward::Badge("bookworm")],
        secret: false,
    },
    Achievement {
        id: "achievement_marathon_reader",
        name: "Marathon Reader",
        category: Category::Reader,
        rarity: Rarity::Epic,
        metric: METRIC_TOTAL_READING_TIME,
        target: 600,
        rewards: &[Reward::Xp(500), Reward::Title("Marathon Reader")],
        secret: false,
    },
    Achievement {
        id: "achievement_first_creation",
        name: "First Creation",
        category: Category::Creator,
        rarity: Rarity::Common,
        metric: METRIC_STORIES_CREATED,
        target: 1,
        rewards: &[Reward::Xp(50)],
        secret: false,
    },
    Achievement {
        id: "achievement_prolific_author",
        name: "Prolific Author",
        category: Category::Creator,
        rarity: Rarity::Epic,
        metric: METRIC_STORIES_CREATED,
        target: 10,
        rewards: &[Reward::Xp(750), Reward::Badge("prolific_author")],
        secret: false,
    },
    Achievement {
        id: "achievement_conversationalist",
        name: "Conversationalist",
        category: Category::Social,
        rarity: Rarity::Uncommon,
        metric: METRIC_COMMENTS_POSTED,
        target: 25,
        rewards: &[Reward::Xp(100)],
        secret: false,
    },
    Achievement {
        id: "achievement_week_streak",
        name: "Week Streak",
        category: Category::Special,
        rarity: Rarity::Uncommon,
        metric: METRIC_STREAK_DAYS,
        target: 7,
        rewards: &[Reward::Xp(100)],
        secret: false,
    },
    Achievement {
        id: "achievement_month_streak",
        name: "Month Streak",
        category: Category::Special,
        rarity: Rarity::Epic,
        metric: METRIC_STREAK_DAYS,
        target: 30,
        rewards: &[Reward::Xp(1000), Reward::Badge("month_streak")],
        secret: false,
    },
    Achievement {
        id: "achievement_rising_star",
        name: "Rising Star",
        category: Category::Special,
        rarity: Rarity::Rare,
        metric: METRIC_LEVEL,
        target: 10,
        rewards: &[Reward::Xp(300)],
        secret: false,
    },
    Achievement {
        id: "achievement_centurion",
        name: "Centurion",
        category: Category::Special,
        rarity: Rarity::Legendary,
        metric: METRIC_LEVEL,
        target: 100,
        rewards: &[Reward::Xp(10_000), Reward::Title("Centurion")],
        secret: true,
    },
];

/// Look up a catalog entry by ID.
pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Resolve a requirement metric against a progress snapshot.
///
/// Unrecognized metrics return `None`, so a requirement naming one is
/// never satisfied.
pub fn metric_value(progress: &PlayerProgress, metric: &str) -> Option<i64> {
    match metric {
        METRIC_STORIES_READ => Some(progress.statistics.stories_read),
        METRIC_STORIES_CREATED => Some(progress.statistics.stories_created),
        METRIC_LEVEL => Some(i64::from(progress.level)),
        METRIC_STREAK_DAYS => Some(i64::from(progress.streak_days)),
        METRIC_COMMENTS_POSTED => Some(progress.statistics.comments_posted),
        METRIC_TOTAL_READING_TIME => Some(progress.statistics.total_reading_time),
        _ => None,
    }
}

/// Return every catalog achievement not yet unlocked whose requirement the
/// snapshot satisfies.
///
/// Compute-only: `achievements_unlocked` is not mutated here. The caller
/// merges the returned list into the persisted unlock set.
pub fn check_achievements(progress: &PlayerProgress) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !progress.achievements_unlocked.iter().any(|u| u == a.id))
        .filter(|a| metric_value(progress, a.metric).is_some_and(|v| v >= a.target))
        .collect()
}
