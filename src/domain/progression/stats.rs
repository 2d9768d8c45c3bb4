//! Per-player lifetime statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::xp::{level_for_xp, xp_for_game, GameOutcome, RankTier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub user_id: UserId,
    pub display_name: String,
    pub total_xp: u64,
    pub games_played: u32,
    pub games_won: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub best_score: u32,
    /// Consecutive calendar days (UTC) with at least one finished game.
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_played_on: Option<NaiveDate>,
    pub updated_at: Timestamp,
}

impl PlayerStats {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            total_xp: 0,
            games_played: 0,
            games_won: 0,
            questions_answered: 0,
            correct_answers: 0,
            best_score: 0,
            current_streak: 0,
            longest_streak: 0,
            last_played_on: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Folds one finished game into the totals and returns the XP it earned.
    pub fn record_game(&mut self, outcome: &GameOutcome, today: NaiveDate) -> u64 {
        self.games_played += 1;
        if outcome.won() {
            self.games_won += 1;
        }
        self.questions_answered += outcome.questions_answered;
        self.correct_answers += outcome.correct_answers;
        self.best_score = self.best_score.max(outcome.score);
        self.advance_streak(today);

        let earned = xp_for_game(outcome);
        self.award_xp(earned);
        earned
    }

    /// Adds XP. There is no way to take XP away.
    pub fn award_xp(&mut self, amount: u64) {
        self.total_xp = self.total_xp.saturating_add(amount);
        self.updated_at = Timestamp::now();
    }

    fn advance_streak(&mut self, today: NaiveDate) {
        self.current_streak = match self.last_played_on {
            Some(last) if last == today => self.current_streak.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.current_streak + 1,
            // clock went backwards; leave the streak alone
            Some(last) if last > today => self.current_streak,
            _ => 1,
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        if self.last_played_on.map_or(true, |last| today > last) {
            self.last_played_on = Some(today);
        }
    }

    /// Fraction of answers that were correct, `0.0` before any answer.
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.questions_answered)
        }
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.total_xp)
    }

    pub fn rank_tier(&self) -> RankTier {
        RankTier::from_xp(self.total_xp)
    }

    /// XP still needed for the next tier, `None` at the top.
    pub fn xp_to_next_tier(&self) -> Option<u64> {
        self.rank_tier()
            .next()
            .map(|next| next.min_xp().saturating_sub(self.total_xp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn stats() -> PlayerStats {
        PlayerStats::new(UserId::new("player-1").unwrap(), "Player One")
    }

    fn game(correct: u32, total: u32, placement: Option<u32>) -> GameOutcome {
        GameOutcome {
            score: correct * 120,
            correct_answers: correct,
            questions_answered: total,
            total_questions: total,
            total_time_ms: 10_000,
            placement,
        }
    }

    #[test]
    fn recording_a_game_updates_totals() {
        let mut s = stats();
        let earned = s.record_game(&game(3, 4, Some(1)), day(1));

        assert_eq!(earned, 85);
        assert_eq!(s.total_xp, 85);
        assert_eq!(s.games_played, 1);
        assert_eq!(s.games_won, 1);
        assert_eq!(s.correct_answers, 3);
        assert_eq!(s.best_score, 360);
        assert_eq!(s.accuracy(), 0.75);
    }

    #[test]
    fn consecutive_days_extend_streak_and_gaps_reset_it() {
        let mut s = stats();
        s.record_game(&game(1, 1, None), day(1));
        s.record_game(&game(1, 1, None), day(2));
        s.record_game(&game(1, 1, None), day(2));
        s.record_game(&game(1, 1, None), day(3));
        assert_eq!(s.current_streak, 3);

        s.record_game(&game(1, 1, None), day(6));
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 3);
        assert_eq!(s.last_played_on, Some(day(6)));
    }

    #[test]
    fn xp_never_decreases() {
        let mut s = stats();
        s.award_xp(u64::MAX);
        s.award_xp(10);
        assert_eq!(s.total_xp, u64::MAX);
    }

    #[test]
    fn xp_to_next_tier_counts_down() {
        let mut s = stats();
        assert_eq!(s.xp_to_next_tier(), Some(500));
        s.award_xp(450);
        assert_eq!(s.xp_to_next_tier(), Some(50));
        s.award_xp(100_000);
        assert_eq!(s.xp_to_next_tier(), None);
    }

    #[test]
    fn empty_stats_have_zero_accuracy() {
        assert_eq!(stats().accuracy(), 0.0);
        assert_eq!(stats().level(), 1);
    }
}
