//! Leaderboard ranking.
//!
//! Ranking is a stable descending sort over the chosen metric. Players with
//! equal scores share a rank and the next distinct score takes the
//! 1-based position after them (competition ranking: 1, 1, 3). Full ties
//! keep input order (stable sort), which pins the ordering for callers that
//! pre-sort by registration date or similar.

use serde::{Deserialize, Serialize};

use crate::progression::PlayerProgress;

/// Metric a leaderboard is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    Level,
    Xp,
    Streak,
    StoriesRead,
}

impl LeaderboardMetric {
    /// The displayed score for a player under this metric.
    pub fn score(&self, player: &PlayerProgress) -> i64 {
        match self {
            LeaderboardMetric::Level => i64::from(player.level),
            LeaderboardMetric::Xp => player.total_xp,
            LeaderboardMetric::Streak => i64::from(player.streak_days),
            LeaderboardMetric::StoriesRead => player.statistics.stories_read,
        }
    }

    /// Sort key: the score plus, for `Level`, lifetime XP as a tiebreaker.
    fn sort_key(&self, player: &PlayerProgress) -> (i64, i64) {
        match self {
            LeaderboardMetric::Level => (i64::from(player.level), player.total_xp),
            other => (other.score(player), 0),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlayer<'a> {
    /// 1-based competition rank (ties share, next distinct skips).
    pub rank: u32,
    pub player: &'a PlayerProgress,
    pub score: i64,
}

/// Rank players by the given metric, descending.
///
/// For `Level`, `total_xp` breaks ties both in ordering and in rank
/// assignment, so two same-level players with different lifetime XP get
/// distinct ranks.
pub fn rank_players<'a>(
    players: &'a [PlayerProgress],
    metric: LeaderboardMetric,
) -> Vec<RankedPlayer<'a>> {
    let mut ordered: Vec<&PlayerProgress> = players.iter().collect();
    ordered.sort_by(|a, b| metric.sort_key(b).cmp(&metric.sort_key(a)));

    let mut out = Vec::with_capacity(ordered.len());
    let mut prev_key: Option<(i64, i64)> = None;
    let mut rank = 0u32;

    for (pos, player) in ordered.into_iter().enumerate() {
        let key = metric.sort_key(player);
        if prev_key != Some(key) {
            rank = pos as u32 + 1;
            prev_key = Some(key);
        }
        out.push(RankedPlayer {
            rank,
            player,
            score: metric.score(player),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(user_id: i64, total_xp: i64) -> PlayerProgress {
        let breakdown = crate::progression::level_from_total_xp(total_xp);
        let mut p = PlayerProgress::new(user_id);
        p.total_xp = total_xp;
        p.level = breakdown.level;
        p.current_xp = breakdown.current_level_xp;
        p.next_level_xp = breakdown.next_level_xp;
        p
    }

    #[test]
    fn xp_ranking_with_tie_shares_rank_and_skips() {
        // Input order pins the tie ordering (stable sort).
        let players = vec![player(1, 300), player(2, 300), player(3, 100)];
        let ranked = rank_players(&players, LeaderboardMetric::Xp);

        assert_eq!(ranked.len(), 3);
        assert_eq!((ranked[0].rank, ranked[0].player.user_id, ranked[0].score), (1, 1, 300));
        assert_eq!((ranked[1].rank, ranked[1].player.user_id, ranked[1].score), (1, 2, 300));
        assert_eq!((ranked[2].rank, ranked[2].player.user_id, ranked[2].score), (3, 3, 100));
    }

    #[test]
    fn level_ranking_breaks_ties_by_total_xp() {
        // Both level 2, but user 2 has more lifetime XP.
        let players = vec![player(1, 150), player(2, 200)];
        let ranked = rank_players(&players, LeaderboardMetric::Level);

        assert_eq!(ranked[0].player.user_id, 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].player.user_id, 1);
        assert_eq!(ranked[1].rank, 2, "same level, different XP: distinct ranks");
    }

    #[test]
    fn streak_ranking() {
        let mut a = player(1, 0);
        a.streak_days = 3;
        let mut b = player(2, 0);
        b.streak_days = 9;
        let players = [a, b];
        let ranked = rank_players(&players, LeaderboardMetric::Streak);
        assert_eq!(ranked[0].player.user_id, 2);
        assert_eq!(ranked[0].score, 9);
    }

    #[test]
    fn stories_read_ranking() {
        let mut a = player(1, 0);
        a.statistics.stories_read = 12;
        let mut b = player(2, 0);
        b.statistics.stories_read = 40;
        let players = [a, b];
        let ranked = rank_players(&players, LeaderboardMetric::StoriesRead);
        assert_eq!(ranked[0].player.user_id, 2);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(rank_players(&[], LeaderboardMetric::Xp).is_empty());
    }
}
