//! Rank assignment for multiplayer results.
//!
//! Ranks are dense: tied scores share a rank, and a player's rank is one plus
//! the number of distinct scores strictly above theirs. `[100, 90, 90, 80]`
//! ranks as `[1, 2, 2, 3]`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// A player's final tally for one quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub user_id: UserId,
    pub display_name: String,
    pub score: u32,
    pub correct_answers: u32,
    pub questions_answered: u32,
    /// Sum of answer times, used only to order tied players for display.
    pub total_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub rank: u32,
    #[serde(flatten)]
    pub player: PlayerScore,
}

/// Orders players by score and assigns dense ranks.
///
/// Display order inside a tie is faster total time first, then user id, so
/// the output is deterministic. The tie-break never changes a rank.
pub fn rank_players(mut players: Vec<PlayerScore>) -> Vec<RankedPlayer> {
    players.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.total_time_ms.cmp(&b.total_time_ms))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let mut ranked = Vec::with_capacity(players.len());
    let mut rank = 0u32;
    let mut previous: Option<u32> = None;

    for player in players {
        if previous != Some(player.score) {
            rank += 1;
            previous = Some(player.score);
        }
        ranked.push(RankedPlayer { rank, player });
    }

    ranked
}

/// Players holding rank 1, or nobody when fewer than two people played.
pub fn winners(ranked: &[RankedPlayer]) -> Vec<&UserId> {
    if ranked.len() < 2 {
        return Vec::new();
    }
    ranked
        .iter()
        .filter(|r| r.rank == 1)
        .map(|r| &r.player.user_id)
        .collect()
}
