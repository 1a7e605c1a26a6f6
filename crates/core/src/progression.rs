//! Player progression engine: XP curve, leveling, streaks, activity rewards.
//!
//! All functions are pure and deterministic. Callers fetch a
//! [`PlayerProgress`] snapshot from the repository layer, transform it
//! here, and persist the result; compute and commit are deliberately
//! separate steps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::achievements::{self, Achievement};

// ---------------------------------------------------------------------------
// XP curve constants
// ---------------------------------------------------------------------------

/// Base XP cost of the first level.
pub const XP_CURVE_BASE: f64 = 100.0;

/// Polynomial growth exponent of the XP curve.
pub const XP_CURVE_MULTIPLIER: f64 = 1.5;

// ---------------------------------------------------------------------------
// Progress snapshot
// ---------------------------------------------------------------------------

/// Monotonic activity counters. Never decremented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub stories_read: i64,
    pub stories_created: i64,
    /// Total reading time in minutes.
    pub total_reading_time: i64,
    pub chapters_completed: i64,
    pub choices_made: i64,
    pub comments_posted: i64,
    pub stories_rated: i64,
    pub followers_gained: i64,
}

/// One player's full progression state.
///
/// Invariant: `total_xp == cumulative_xp_below(level) + current_xp`, and
/// `0 <= current_xp < next_level_xp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub user_id: i64,
    pub level: i32,
    /// XP accrued within the current level.
    pub current_xp: i64,
    /// XP needed to complete the current level.
    pub next_level_xp: i64,
    /// Lifetime XP, monotonically non-decreasing.
    pub total_xp: i64,
    pub streak_days: i32,
    /// Calendar day (UTC) of the last qualifying activity.
    pub last_active_date: Option<NaiveDate>,
    /// Unlocked achievement IDs, append-only.
    pub achievements_unlocked: Vec<String>,
    pub active_quests: Vec<String>,
    pub completed_quests: Vec<String>,
    pub statistics: PlayerStatistics,
}

impl PlayerProgress {
    /// Fresh progress for a user's first XP-earning event.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            level: 1,
            current_xp: 0,
            next_level_xp: xp_for_level(1),
            total_xp: 0,
            streak_days: 0,
            last_active_date: None,
            achievements_unlocked: Vec::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            statistics: PlayerStatistics::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// XP curve
// ---------------------------------------------------------------------------

/// XP required to advance from `level` to `level + 1`.
///
/// `floor(100 * level^1.5)`, strictly increasing for `level >= 1`.
pub fn xp_for_level(level: i32) -> i64 {
    let level = level.max(1);
    (XP_CURVE_BASE * f64::from(level).powf(XP_CURVE_MULTIPLIER)).floor() as i64
}

/// Total XP consumed by all levels below `level` (levels `1..level`).
pub fn cumulative_xp_below(level: i32) -> i64 {
    (1..level).map(xp_for_level).sum()
}

/// Level reconstruction from lifetime XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBreakdown {
    pub level: i32,
    /// XP accrued within the current level.
    pub current_level_xp: i64,
    /// XP needed to complete the current level.
    pub next_level_xp: i64,
}

/// Walk the XP curve to find the level a lifetime XP total corresponds to.
///
/// The level is the largest L such that the cumulative cost of levels
/// `1..L` is at most `total_xp`. Terminates for any input because the
/// per-level cost grows polynomially. Negative input clamps to zero.
pub fn level_from_total_xp(total_xp: i64) -> LevelBreakdown {
    let total_xp = total_xp.max(0);
    let mut level = 1;
    let mut consumed = 0i64;

    while total_xp - consumed >= xp_for_level(level) {
        consumed += xp_for_level(level);
        level += 1;
    }

    LevelBreakdown {
        level,
        current_level_xp: total_xp - consumed,
        next_level_xp: xp_for_level(level),
    }
}

// ---------------------------------------------------------------------------
// XP awarding
// ---------------------------------------------------------------------------

/// Result of applying an XP award to a progress snapshot.
#[derive(Debug, Clone)]
pub struct XpAward {
    pub progress: PlayerProgress,
    pub leveled_up: bool,
    /// Achievements newly satisfied by the post-award state. The caller is
    /// responsible for merging these into the persisted unlock set.
    pub unlocked: Vec<&'static Achievement>,
}

/// Apply an XP award, recomputing level fields from the new lifetime total.
///
/// `amount <= 0` is a no-op on the XP/level fields (the snapshot is returned
/// unchanged) but the achievement check still runs, so the call is safe to
/// issue unconditionally. `_reason` names the source of the award; callers
/// log it.
pub fn award_xp(progress: &PlayerProgress, amount: i64, _reason: &str) -> XpAward {
    let mut next = progress.clone();
    let mut leveled_up = false;

    if amount > 0 {
        next.total_xp = progress.total_xp + amount;
        let breakdown = level_from_total_xp(next.total_xp);
        leveled_up = breakdown.level > progress.level;
        next.level = breakdown.level;
        next.current_xp = breakdown.current_level_xp;
        next.next_level_xp = breakdown.next_level_xp;
    }

    let unlocked = achievements::check_achievements(&next);

    XpAward {
        progress: next,
        leveled_up,
        unlocked,
    }
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// Update the daily streak for activity on `today` (UTC calendar day).
///
/// Transition table:
/// - same day as `last_active_date` (or earlier): unchanged
/// - exactly one day later: streak + 1
/// - more than one day later, or no prior date: reset to 1
///
/// `last_active_date` is set to `today` in every branch except the
/// unchanged case. A single active day always counts as streak 1.
pub fn update_streak(progress: &PlayerProgress, today: NaiveDate) -> PlayerProgress {
    let mut next = progress.clone();

    match progress.last_active_date {
        Some(last) => {
            let gap = (today - last).num_days();
            if gap <= 0 {
                return next;
            }
            next.streak_days = if gap == 1 { progress.streak_days + 1 } else { 1 };
        }
        None => {
            next.streak_days = 1;
        }
    }

    next.last_active_date = Some(today);
    next
}

// ---------------------------------------------------------------------------
// Qualifying activities
// ---------------------------------------------------------------------------

/// A qualifying activity that earns XP and bumps a statistics counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    ChapterRead,
    StoryFinished,
    ChoiceMade,
    CommentPosted,
    StoryRated,
    StoryCreated,
    FollowerGained,
    GlobalStoryAction,
    ReadingSession { minutes: i64 },
}

impl Activity {
    /// XP granted for one occurrence of this activity.
    pub fn xp_reward(&self) -> i64 {
        match self {
            Activity::ChapterRead => 10,
            Activity::StoryFinished => 50,
            Activity::ChoiceMade => 2,
            Activity::CommentPosted => 5,
            Activity::StoryRated => 5,
            Activity::StoryCreated => 100,
            Activity::FollowerGained => 10,
            Activity::GlobalStoryAction => 25,
            Activity::ReadingSession { .. } => 5,
        }
    }

    /// Human-readable reason string for audit logging.
    pub fn reason(&self) -> &'static str {
        match self {
            Activity::ChapterRead => "chapter_read",
            Activity::StoryFinished => "story_finished",
            Activity::ChoiceMade => "choice_made",
            Activity::CommentPosted => "comment_posted",
            Activity::StoryRated => "story_rated",
            Activity::StoryCreated => "story_created",
            Activity::FollowerGained => "follower_gained",
            Activity::GlobalStoryAction => "global_story_action",
            Activity::ReadingSession { .. } => "reading_session",
        }
    }

    /// Bump the statistics counter this activity maps to.
    pub fn apply(&self, stats: &mut PlayerStatistics) {
        match *self {
            Activity::ChapterRead => stats.chapters_completed += 1,
            Activity::StoryFinished => stats.stories_read += 1,
            Activity::ChoiceMade => stats.choices_made += 1,
            Activity::CommentPosted => stats.comments_posted += 1,
            Activity::StoryRated => stats.stories_rated += 1,
            Activity::StoryCreated => stats.stories_created += 1,
            Activity::FollowerGained => stats.followers_gained += 1,
            Activity::GlobalStoryAction => {}
            Activity::ReadingSession { minutes } => {
                stats.total_reading_time += minutes.max(0);
            }
        }
    }
}

/// Record a qualifying activity against a progress snapshot: bumps the
/// mapped statistic, awards the activity's XP, and updates the streak.
///
/// Returns the award result; the caller persists `result.progress` and the
/// returned unlocks.
pub fn record_activity(progress: &PlayerProgress, activity: Activity, today: NaiveDate) -> XpAward {
    let mut staged = update_streak(progress, today);
    activity.apply(&mut staged.statistics);
    award_xp(&staged, activity.xp_reward(), activity.reason())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_progress() -> PlayerProgress {
        PlayerProgress::new(7)
    }

    // -- XP curve ---------------------------------------------------------

    #[test]
    fn xp_for_level_one() {
        assert_eq!(xp_for_level(1), 100);
    }

    #[test]
    fn xp_curve_strictly_increasing() {
        for level in 1..200 {
            assert!(
                xp_for_level(level + 1) > xp_for_level(level),
                "curve must be strictly increasing at level {level}"
            );
        }
    }

    #[test]
    fn xp_for_level_clamps_below_one() {
        assert_eq!(xp_for_level(0), xp_for_level(1));
        assert_eq!(xp_for_level(-5), xp_for_level(1));
    }

    // -- level_from_total_xp ------------------------------------------------

    #[test]
    fn zero_total_xp_is_level_one() {
        let b = level_from_total_xp(0);
        assert_eq!(b.level, 1);
        assert_eq!(b.current_level_xp, 0);
        assert_eq!(b.next_level_xp, 100);
    }

    #[test]
    fn exactly_one_level_of_xp() {
        let b = level_from_total_xp(100);
        assert_eq!(b.level, 2);
        assert_eq!(b.current_level_xp, 0);
        assert_eq!(b.next_level_xp, xp_for_level(2));
    }

    #[test]
    fn partial_progress_within_level() {
        let b = level_from_total_xp(150);
        assert_eq!(b.level, 2);
        assert_eq!(b.current_level_xp, 50);
    }

    #[test]
    fn negative_total_xp_clamps() {
        let b = level_from_total_xp(-10);
        assert_eq!(b.level, 1);
        assert_eq!(b.current_level_xp, 0);
    }

    #[test]
    fn level_xp_round_trip() {
        for total in [0i64, 1, 99, 100, 101, 382, 383, 1000, 12_345, 1_000_000] {
            let b = level_from_total_xp(total);
            assert_eq!(
                cumulative_xp_below(b.level) + b.current_level_xp,
                total,
                "round trip failed for total_xp {total}"
            );
            assert!(b.current_level_xp < b.next_level_xp);
        }
    }

    // -- award_xp -----------------------------------------------------------

    #[test]
    fn award_zero_is_noop() {
        let p = base_progress();
        let award = award_xp(&p, 0, "noop");
        assert_eq!(award.progress.level, p.level);
        assert_eq!(award.progress.current_xp, p.current_xp);
        assert_eq!(award.progress.total_xp, p.total_xp);
        assert!(!award.leveled_up);
    }

    #[test]
    fn award_negative_is_noop() {
        let p = base_progress();
        let award = award_xp(&p, -50, "bogus");
        assert_eq!(award.progress.total_xp, 0);
        assert!(!award.leveled_up);
    }

    #[test]
    fn award_accumulates_within_level() {
        let p = base_progress();
        let award = award_xp(&p, 40, "test");
        assert_eq!(award.progress.level, 1);
        assert_eq!(award.progress.current_xp, 40);
        assert_eq!(award.progress.total_xp, 40);
        assert!(!award.leveled_up);
    }

    #[test]
    fn award_levels_up_at_boundary() {
        let p = base_progress();
        let award = award_xp(&p, 100, "test");
        assert_eq!(award.progress.level, 2);
        assert_eq!(award.progress.current_xp, 0);
        assert!(award.leveled_up);
    }

    #[test]
    fn award_can_skip_multiple_levels() {
        let p = base_progress();
        // 100 (level 1) + 282 (level 2) = 382 consumed, 18 left over.
        let award = award_xp(&p, 400, "big");
        assert_eq!(award.progress.level, 3);
        assert_eq!(award.progress.current_xp, 400 - cumulative_xp_below(3));
        assert!(award.leveled_up);
    }

    #[test]
    fn award_checks_achievements_on_new_state() {
        let mut p = base_progress();
        p.statistics.stories_read = 1;
        let award = award_xp(&p, 10, "read");
        assert!(award
            .unlocked
            .iter()
            .any(|a| a.id == "achievement_first_story"));
    }

    // -- update_streak --------------------------------------------------------

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn streak_same_day_unchanged() {
        let mut p = base_progress();
        p.streak_days = 4;
        p.last_active_date = Some(day(2025, 3, 10));
        let next = update_streak(&p, day(2025, 3, 10));
        assert_eq!(next.streak_days, 4);
        assert_eq!(next.last_active_date, Some(day(2025, 3, 10)));
    }

    #[test]
    fn streak_next_day_increments() {
        let mut p = base_progress();
        p.streak_days = 4;
        p.last_active_date = Some(day(2025, 3, 10));
        let next = update_streak(&p, day(2025, 3, 11));
        assert_eq!(next.streak_days, 5);
        assert_eq!(next.last_active_date, Some(day(2025, 3, 11)));
    }

    #[test]
    fn streak_gap_resets_to_one() {
        let mut p = base_progress();
        p.streak_days = 9;
        p.last_active_date = Some(day(2025, 3, 10));
        let next = update_streak(&p, day(2025, 3, 15));
        assert_eq!(next.streak_days, 1);
        assert_eq!(next.last_active_date, Some(day(2025, 3, 15)));
    }

    #[test]
    fn streak_first_activity_is_one() {
        let p = base_progress();
        let next = update_streak(&p, day(2025, 3, 10));
        assert_eq!(next.streak_days, 1);
        assert_eq!(next.last_active_date, Some(day(2025, 3, 10)));
    }

    #[test]
    fn streak_month_boundary_increments() {
        let mut p = base_progress();
        p.streak_days = 2;
        p.last_active_date = Some(day(2025, 3, 31));
        let next = update_streak(&p, day(2025, 4, 1));
        assert_eq!(next.streak_days, 3);
    }

    // -- activities -------------------------------------------------------------

    #[test]
    fn record_activity_bumps_statistic_and_xp() {
        let p = base_progress();
        let award = record_activity(&p, Activity::ChapterRead, day(2025, 3, 10));
        assert_eq!(award.progress.statistics.chapters_completed, 1);
        assert_eq!(award.progress.total_xp, Activity::ChapterRead.xp_reward());
        assert_eq!(award.progress.streak_days, 1);
    }

    #[test]
    fn reading_session_accumulates_minutes() {
        let p = base_progress();
        let award = record_activity(
            &p,
            Activity::ReadingSession { minutes: 42 },
            day(2025, 3, 10),
        );
        assert_eq!(award.progress.statistics.total_reading_time, 42);
    }

    #[test]
    fn reading_session_ignores_negative_minutes() {
        let p = base_progress();
        let award = record_activity(
            &p,
            Activity::ReadingSession { minutes: -5 },
            day(2025, 3, 10),
        );
        assert_eq!(award.progress.statistics.total_reading_time, 0);
    }
}
