//! Daily challenge generation.
//!
//! The challenge set is static by contract; only the reward scaling varies
//! with player level.

use serde::Serialize;

/// One challenge objective with its level-scaled XP reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeItem {
    pub id: &'static str,
    pub description: &'static str,
    pub target: i64,
    pub reward_xp: i64,
}

/// The day's challenge set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChallenge {
    pub items: Vec<ChallengeItem>,
    pub bonus_multiplier: f64,
}

/// Base (unscaled) challenge definitions.
const BASE_ITEMS: &[(&str, &str, i64, i64)] = &[
    ("challenge_read_chapters", "Read 3 chapters", 3, 30),
    ("challenge_make_choices", "Make 10 choices", 10, 20),
    ("challenge_rate_story", "Rate a story", 1, 15),
];

/// Reward multiplier: +10% per 10 full levels.
pub fn bonus_multiplier(player_level: i32) -> f64 {
    1.0 + f64::from(player_level.max(1) / 10) * 0.1
}

/// Build the fixed 3-item daily challenge, scaling rewards by player level.
pub fn daily_challenge(player_level: i32) -> DailyChallenge {
    let multiplier = bonus_multiplier(player_level);
    let items = BASE_ITEMS
        .iter()
        .map(|&(id, description, target, base_xp)| ChallengeItem {
            id,
            description,
            target,
            reward_xp: (base_xp as f64 * multiplier).floor() as i64,
        })
        .collect();

    DailyChallenge {
        items,
        bonus_multiplier: multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_steps_every_ten_levels() {
        assert_eq!(bonus_multiplier(1), 1.0);
        assert_eq!(bonus_multiplier(9), 1.0);
        assert_eq!(bonus_multiplier(10), 1.1);
        assert_eq!(bonus_multiplier(19), 1.1);
        assert_eq!(bonus_multiplier(20), 1.2);
        assert_eq!(bonus_multiplier(50), 1.5);
    }

    #[test]
    fn challenge_has_three_fixed_items() {
        let c = daily_challenge(1);
        assert_eq!(c.items.len(), 3);
        assert_eq!(c.items[0].id, "challenge_read_chapters");
        assert_eq!(c.items[1].id, "challenge_make_choices");
        assert_eq!(c.items[2].id, "challenge_rate_story");
    }

    #[test]
    fn rewards_unscaled_below_level_ten() {
        let c = daily_challenge(5);
        assert_eq!(c.items[0].reward_xp, 30);
        assert_eq!(c.items[1].reward_xp, 20);
        assert_eq!(c.items[2].reward_xp, 15);
    }

    #[test]
    fn rewards_scaled_at_level_twenty() {
        let c = daily_challenge(20);
        assert_eq!(c.bonus_multiplier, 1.2);
        assert_eq!(c.items[0].reward_xp, 36);
        assert_eq!(c.items[1].reward_xp, 24);
        assert_eq!(c.items[2].reward_xp, 18);
    }

    #[test]
    fn deterministic_for_same_level() {
        assert_eq!(daily_challenge(12), daily_challenge(12));
    }
}
