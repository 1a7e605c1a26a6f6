//! Progression orchestration: load a snapshot, transform it in core,
//! persist the result.

use serde::Serialize;
use sqlx::PgPool;
use stxry_core::achievements::{Achievement, Reward};
use stxry_core::progression::{self, Activity, PlayerProgress, XpAward};
use stxry_core::types::DbId;
use stxry_db::repositories::ProgressRepo;

use crate::error::{AppError, AppResult};

/// What recording an activity produced, returned to the client so it can
/// animate XP gain and unlock toasts.
#[derive(Debug, Serialize)]
pub struct ActivityOutcome {
    pub progress: PlayerProgress,
    /// XP of the triggering event itself. Unlock rewards are paid on top
    /// and show up in `progress.total_xp`.
    pub xp_awarded: i64,
    pub leveled_up: bool,
    /// Ids of achievements newly unlocked by this event.
    pub unlocked: Vec<String>,
}

/// Record a qualifying activity for a user and persist the new snapshot.
///
/// The streak day is the current UTC calendar date. Newly satisfied
/// achievements are merged into the persisted unlock set; re-reporting an
/// already-unlocked achievement is filtered out of the outcome.
pub async fn record_activity(
    pool: &PgPool,
    user_id: DbId,
    activity: Activity,
) -> AppResult<ActivityOutcome> {
    let progress = ProgressRepo::get_or_create(pool, user_id).await?;
    let today = chrono::Utc::now().date_naive();

    let award = progression::record_activity(&progress, activity, today);
    let outcome = commit_award(pool, &progress, award, activity.xp_reward()).await?;

    if outcome.leveled_up {
        tracing::info!(
            user_id,
            level = outcome.progress.level,
            reason = activity.reason(),
            "Player leveled up"
        );
    }

    Ok(outcome)
}

/// Grant a flat XP amount outside the activity table (quest rewards).
pub async fn grant_xp(
    pool: &PgPool,
    user_id: DbId,
    amount: i64,
    reason: &str,
) -> AppResult<ActivityOutcome> {
    if amount <= 0 {
        return Err(AppError::BadRequest("XP amount must be positive".into()));
    }

    let progress = ProgressRepo::get_or_create(pool, user_id).await?;
    let award = progression::award_xp(&progress, amount, reason);
    commit_award(pool, &progress, award, amount).await
}

/// Persist an award: pay out the XP rewards attached to new unlocks, save
/// the snapshot, merge the unlocks into the stored set, and fold them into
/// the returned progress so the client sees a consistent view without a
/// second fetch.
///
/// Unlock rewards can themselves satisfy further achievements (the
/// level-gated ones), so payouts settle in rounds before anything is
/// written. Each round consumes at least one catalog entry, so the loop is
/// bounded by the catalog size.
async fn commit_award(
    pool: &PgPool,
    before: &PlayerProgress,
    award: XpAward,
    xp_awarded: i64,
) -> AppResult<ActivityOutcome> {
    let mut progress = award.progress;
    let mut leveled_up = award.leveled_up;
    let mut unlocked: Vec<String> = Vec::new();

    let mut batch: Vec<&'static Achievement> = award
        .unlocked
        .into_iter()
        .filter(|a| !before.achievements_unlocked.iter().any(|u| u == a.id))
        .collect();

    while !batch.is_empty() {
        let mut reward_xp = 0i64;
        for achievement in &batch {
            unlocked.push(achievement.id.to_string());
            progress.achievements_unlocked.push(achievement.id.to_string());
            for reward in achievement.rewards {
                if let Reward::Xp(amount) = reward {
                    reward_xp += amount;
                }
            }
        }
        if reward_xp == 0 {
            break;
        }
        let next = progression::award_xp(&progress, reward_xp, "achievement_reward");
        leveled_up = leveled_up || next.leveled_up;
        progress = next.progress;
        batch = next.unlocked;
    }

    ProgressRepo::save(pool, &progress).await?;
    let unlocked_ids: Vec<&str> = unlocked.iter().map(String::as_str).collect();
    ProgressRepo::unlock_achievements(pool, before.user_id, &unlocked_ids).await?;

    Ok(ActivityOutcome {
        progress,
        xp_awarded,
        leveled_up,
        unlocked,
    })
}
