//! Quiz session repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, QuizSessionId};
use crate::domain::quiz::{FlaggedAnswer, Participant, QuizAnswer, QuizSession};

#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    /// Persists a new session with its initial participants.
    async fn save(&self, session: &QuizSession) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &QuizSessionId) -> Result<Option<QuizSession>, DomainError>;

    /// Adds a late joiner (clan sessions). Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the stored session is no longer active
    async fn add_participant(&self, id: &QuizSessionId, participant: &Participant) -> Result<(), DomainError>;

    /// Stores one scored answer together with its anti-cheat flag, if any.
    ///
    /// # Errors
    ///
    /// - `AlreadyAnswered` if the player already answered that question
    /// - `InvalidStateTransition` if the stored session is no longer active
    async fn record_answer(
        &self,
        id: &QuizSessionId,
        answer: &QuizAnswer,
        flag: Option<&FlaggedAnswer>,
    ) -> Result<(), DomainError>;

    /// Moves a stored active session to completed, using the completion time
    /// carried by `session`. Only one caller can win this transition.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the stored session is already completed
    /// - `QuizSessionNotFound` if there is no such session
    async fn mark_completed(&self, session: &QuizSession) -> Result<(), DomainError>;
}
