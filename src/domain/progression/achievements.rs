//! Achievement catalog and unlock rules.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::Timestamp;

use super::stats::PlayerStats;
use super::xp::GameOutcome;

/// Speed Demon needs an average answer time under this.
const SPEED_DEMON_AVG_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstGame,
    TenGames,
    FiftyGames,
    FirstWin,
    TenWins,
    PerfectGame,
    SpeedDemon,
    Streak3,
    Streak7,
    Xp1000,
    Xp10000,
    ClanMember,
    Scholar,
}

str_enum!(AchievementId {
    FirstGame => "first_game",
    TenGames => "ten_games",
    FiftyGames => "fifty_games",
    FirstWin => "first_win",
    TenWins => "ten_wins",
    PerfectGame => "perfect_game",
    SpeedDemon => "speed_demon",
    Streak3 => "streak_3",
    Streak7 => "streak_7",
    Xp1000 => "xp_1000",
    Xp10000 => "xp_10000",
    ClanMember => "clan_member",
    Scholar => "scholar",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub xp_reward: u64,
}

pub const CATALOG: &[Achievement] = &[
    Achievement {
        id: AchievementId::FirstGame,
        title: "First Steps",
        description: "Finish your first quiz",
        xp_reward: 10,
    },
    Achievement {
        id: AchievementId::TenGames,
        title: "Regular",
        description: "Finish 10 quizzes",
        xp_reward: 50,
    },
    Achievement {
        id: AchievementId::FiftyGames,
        title: "Veteran",
        description: "Finish 50 quizzes",
        xp_reward: 200,
    },
    Achievement {
        id: AchievementId::FirstWin,
        title: "Victor",
        description: "Win a multiplayer battle",
        xp_reward: 25,
    },
    Achievement {
        id: AchievementId::TenWins,
        title: "Champion",
        description: "Win 10 multiplayer battles",
        xp_reward: 150,
    },
    Achievement {
        id: AchievementId::PerfectGame,
        title: "Flawless",
        description: "Answer every question correctly in a quiz of 5 or more",
        xp_reward: 50,
    },
    Achievement {
        id: AchievementId::SpeedDemon,
        title: "Speed Demon",
        description: "Perfect quiz of 5 or more with answers averaging under 3 seconds",
        xp_reward: 75,
    },
    Achievement {
        id: AchievementId::Streak3,
        title: "On a Roll",
        description: "Play on 3 consecutive days",
        xp_reward: 30,
    },
    Achievement {
        id: AchievementId::Streak7,
        title: "Dedicated",
        description: "Play on 7 consecutive days",
        xp_reward: 100,
    },
    Achievement {
        id: AchievementId::Xp1000,
        title: "Rising Star",
        description: "Earn 1,000 XP",
        xp_reward: 0,
    },
    Achievement {
        id: AchievementId::Xp10000,
        title: "Luminary",
        description: "Earn 10,000 XP",
        xp_reward: 0,
    },
    Achievement {
        id: AchievementId::ClanMember,
        title: "Better Together",
        description: "Join or found a clan",
        xp_reward: 20,
    },
    Achievement {
        id: AchievementId::Scholar,
        title: "Scholar",
        description: "Generate your first AI study set",
        xp_reward: 15,
    },
];

pub fn find(id: AchievementId) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// What just happened, beyond the lifetime totals.
#[derive(Debug, Clone, Default)]
pub struct AchievementContext<'a> {
    pub last_game: Option<&'a GameOutcome>,
    pub in_clan: bool,
    pub generated_study_set: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: AchievementId,
    pub unlocked_at: Timestamp,
}

fn qualifies(id: AchievementId, stats: &PlayerStats, ctx: &AchievementContext<'_>) -> bool {
    match id {
        AchievementId::FirstGame => stats.games_played >= 1,
        AchievementId::TenGames => stats.games_played >= 10,
        AchievementId::FiftyGames => stats.games_played >= 50,
        AchievementId::FirstWin => stats.games_won >= 1,
        AchievementId::TenWins => stats.games_won >= 10,
        AchievementId::PerfectGame => ctx.last_game.map_or(false, GameOutcome::is_perfect),
        AchievementId::SpeedDemon => ctx.last_game.map_or(false, |g| {
            g.is_perfect() && g.average_answer_ms().map_or(false, |avg| avg < SPEED_DEMON_AVG_MS)
        }),
        AchievementId::Streak3 => stats.longest_streak >= 3,
        AchievementId::Streak7 => stats.longest_streak >= 7,
        AchievementId::Xp1000 => stats.total_xp >= 1_000,
        AchievementId::Xp10000 => stats.total_xp >= 10_000,
        AchievementId::ClanMember => ctx.in_clan,
        AchievementId::Scholar => ctx.generated_study_set,
    }
}

/// Returns achievements newly earned, and applies their XP to `stats`.
///
/// XP rewards can push totals past an XP milestone, so evaluation repeats
/// until nothing new unlocks.
pub fn unlock_new(
    stats: &mut PlayerStats,
    ctx: &AchievementContext<'_>,
    already_unlocked: &HashSet<AchievementId>,
) -> Vec<&'static Achievement> {
    let mut unlocked: Vec<&'static Achievement> = Vec::new();

    loop {
        let fresh: Vec<&'static Achievement> = CATALOG
            .iter()
            .filter(|a| !already_unlocked.contains(&a.id))
            .filter(|a| !unlocked.iter().any(|u| u.id == a.id))
            .filter(|a| qualifies(a.id, stats, ctx))
            .collect();

        if fresh.is_empty() {
            break;
        }
        for achievement in fresh {
            stats.award_xp(achievement.xp_reward);
            unlocked.push(achievement);
        }
    }

    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn stats() -> PlayerStats {
        PlayerStats::new(UserId::new("u1").unwrap(), "U1")
    }

    fn perfect_fast_game() -> GameOutcome {
        GameOutcome {
            score: 900,
            correct_answers: 5,
            questions_answered: 5,
            total_questions: 5,
            total_time_ms: 5 * 2_000,
            placement: None,
        }
    }

    #[test]
    fn catalog_ids_are_unique_and_parseable() {
        let ids: HashSet<AchievementId> = CATALOG.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
        for a in CATALOG {
            assert_eq!(AchievementId::parse(a.id.as_str()), Some(a.id));
        }
    }

    #[test]
    fn first_game_unlocks_once() {
        let mut s = stats();
        s.games_played = 1;

        let first = unlock_new(&mut s, &AchievementContext::default(), &HashSet::new());
        assert_eq!(first.iter().map(|a| a.id).collect::<Vec<_>>(), vec![AchievementId::FirstGame]);
        assert_eq!(s.total_xp, 10);

        let already: HashSet<_> = [AchievementId::FirstGame].into_iter().collect();
        let again = unlock_new(&mut s, &AchievementContext::default(), &already);
        assert!(again.is_empty());
    }

    #[test]
    fn perfect_fast_game_unlocks_both_game_achievements() {
        let mut s = stats();
        s.games_played = 1;
        let game = perfect_fast_game();
        let ctx = AchievementContext {
            last_game: Some(&game),
            ..Default::default()
        };

        let ids: Vec<_> = unlock_new(&mut s, &ctx, &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert!(ids.contains(&AchievementId::PerfectGame));
        assert!(ids.contains(&AchievementId::SpeedDemon));
    }

    #[test]
    fn rewards_can_cascade_into_xp_milestone() {
        let mut s = stats();
        s.total_xp = 995;
        s.games_played = 1;

        let ids: Vec<_> = unlock_new(&mut s, &AchievementContext::default(), &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![AchievementId::FirstGame, AchievementId::Xp1000]);
        assert_eq!(s.total_xp, 1_005);
    }

    #[test]
    fn clan_and_study_flags_come_from_context() {
        let mut s = stats();
        let ctx = AchievementContext {
            in_clan: true,
            generated_study_set: true,
            ..Default::default()
        };
        let ids: Vec<_> = unlock_new(&mut s, &ctx, &HashSet::new()).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AchievementId::ClanMember, AchievementId::Scholar]);
    }
}
