//! Finished-game history.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{DomainError, QuizSessionId, Timestamp, UserId};
use crate::domain::quiz::QuizMode;

use super::SaveResult;

/// One player's line in a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub session_id: QuizSessionId,
    pub user_id: UserId,
    pub mode: QuizMode,
    pub rank: u32,
    pub player_count: u32,
    pub score: u32,
    pub correct_answers: u32,
    pub questions_answered: u32,
    pub total_time_ms: u64,
    pub xp_earned: u64,
    pub finished_at: Timestamp,
}

#[async_trait]
pub trait GameResultRepository: Send + Sync {
    /// Stores one player's line. The (session, user) key is also the payout
    /// ledger: `AlreadyExists` means that player has already been paid for the
    /// session and the stored line is left untouched.
    async fn claim(&self, result: &GameResult) -> Result<SaveResult, DomainError>;

    /// Drops a claimed line whose payout could not be applied, so a retry pays it.
    async fn release(&self, session_id: &QuizSessionId, user_id: &UserId) -> Result<(), DomainError>;

    async fn for_session(&self, session_id: &QuizSessionId) -> Result<Vec<GameResult>, DomainError>;

    /// A user's most recent games, newest first.
    async fn recent_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<GameResult>, DomainError>;
}
