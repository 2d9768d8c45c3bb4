//! Points awarded per answer.

use super::Difficulty;

pub const BASE_POINTS: u32 = 100;
pub const MAX_SPEED_BONUS: u32 = 50;

/// Answers quicker than this are flagged as suspicious.
pub const MIN_PLAUSIBLE_ANSWER_MS: u64 = 300;

/// Points for one answer.
///
/// Correct answers earn the base plus a speed bonus that shrinks linearly to
/// zero at the time limit, scaled by difficulty. Wrong answers earn nothing.
pub fn points_for_answer(
    correct: bool,
    difficulty: Difficulty,
    time_taken_ms: u64,
    time_limit_ms: u64,
) -> u32 {
    if !correct {
        return 0;
    }

    let bonus = if time_limit_ms == 0 {
        0.0
    } else {
        let remaining = time_limit_ms.saturating_sub(time_taken_ms) as f64;
        MAX_SPEED_BONUS as f64 * remaining / time_limit_ms as f64
    };

    ((BASE_POINTS as f64 + bonus) * difficulty.multiplier()).round() as u32
}

pub fn is_suspiciously_fast(time_taken_ms: u64) -> bool {
    time_taken_ms < MIN_PLAUSIBLE_ANSWER_MS
}
