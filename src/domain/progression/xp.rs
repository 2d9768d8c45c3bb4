//! XP awards, levels and rank tiers.
//!
//! All formulas are fixed; XP only ever grows.

use serde::{Deserialize, Serialize};

pub const XP_PER_CORRECT_ANSWER: u64 = 10;
pub const XP_FOR_COMPLETION: u64 = 5;
pub const XP_PERFECT_BONUS: u64 = 25;
/// Perfect-game bonus needs at least this many questions.
pub const PERFECT_GAME_MIN_QUESTIONS: u32 = 5;

/// How one player did in one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub score: u32,
    pub correct_answers: u32,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub total_time_ms: u64,
    /// Placement, present only for games with at least two players.
    pub placement: Option<u32>,
}

impl GameOutcome {
    pub fn won(&self) -> bool {
        self.placement == Some(1)
    }

    pub fn is_perfect(&self) -> bool {
        self.total_questions >= PERFECT_GAME_MIN_QUESTIONS
            && self.correct_answers == self.total_questions
    }

    pub fn average_answer_ms(&self) -> Option<u64> {
        if self.questions_answered == 0 {
            None
        } else {
            Some(self.total_time_ms / u64::from(self.questions_answered))
        }
    }
}

fn placement_bonus(placement: Option<u32>) -> u64 {
    match placement {
        Some(1) => 50,
        Some(2) => 25,
        Some(3) => 10,
        _ => 0,
    }
}

/// XP earned by one game.
pub fn xp_for_game(outcome: &GameOutcome) -> u64 {
    let mut xp = XP_FOR_COMPLETION + XP_PER_CORRECT_ANSWER * u64::from(outcome.correct_answers);
    xp += placement_bonus(outcome.placement);
    if outcome.is_perfect() {
        xp += XP_PERFECT_BONUS;
    }
    xp
}

/// `floor(sqrt(xp / 100)) + 1`
pub fn level_for_xp(total_xp: u64) -> u32 {
    let hundreds = total_xp / 100;
    let mut root = (hundreds as f64).sqrt() as u64;
    // correct float rounding at perfect squares
    while root * root > hundreds {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= hundreds {
        root += 1;
    }
    root as u32 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl RankTier {
    const ALL: [RankTier; 7] = [
        RankTier::Bronze,
        RankTier::Silver,
        RankTier::Gold,
        RankTier::Platinum,
        RankTier::Diamond,
        RankTier::Master,
        RankTier::Grandmaster,
    ];

    /// XP at which this tier starts.
    pub fn min_xp(&self) -> u64 {
        match self {
            RankTier::Bronze => 0,
            RankTier::Silver => 500,
            RankTier::Gold => 1_500,
            RankTier::Platinum => 3_500,
            RankTier::Diamond => 7_000,
            RankTier::Master => 12_000,
            RankTier::Grandmaster => 20_000,
        }
    }

    pub fn from_xp(total_xp: u64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| total_xp >= tier.min_xp())
            .unwrap_or(RankTier::Bronze)
    }

    pub fn next(&self) -> Option<RankTier> {
        Self::ALL.iter().copied().find(|tier| tier > self)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Platinum => "Platinum",
            RankTier::Diamond => "Diamond",
            RankTier::Master => "Master",
            RankTier::Grandmaster => "Grandmaster",
        }
    }
}
