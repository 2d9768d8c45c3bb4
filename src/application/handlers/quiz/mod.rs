//! Quiz handlers - starting, playing and finishing quiz sessions.

mod complete_quiz;
mod question_selection;
mod session_queries;
mod start_solo;
mod submit_answer;

pub use complete_quiz::{CompleteQuizHandler, CompletedQuiz, PlayerResult};
pub use question_selection::{select_questions, QuestionSelection, DEFAULT_QUESTION_COUNT};
pub use session_queries::{GetQuizResultsHandler, GetQuizSessionHandler, QuizResults, SessionWithQuestions};
pub use start_solo::{StartSoloQuizCommand, StartSoloQuizHandler};
pub use submit_answer::{AnsweredQuestion, SubmitAnswerCommand, SubmitAnswerHandler};

#[cfg(test)]
pub(crate) use question_selection::test_support;

use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId, UserId};
use crate::domain::quiz::QuizSession;
use crate::ports::{ClanRepository, QuizSessionRepository};

pub(crate) async fn load_session(
    sessions: &dyn QuizSessionRepository,
    id: &QuizSessionId,
) -> Result<QuizSession, DomainError> {
    sessions
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::QuizSessionNotFound, "Quiz session not found"))
}

/// Whether `user_id` belongs to the clan hosting `session`, if any.
pub(crate) async fn is_clan_member(
    clans: &dyn ClanRepository,
    session: &QuizSession,
    user_id: &UserId,
) -> Result<bool, DomainError> {
    let Some(clan_id) = session.clan_id() else {
        return Ok(false);
    };
    Ok(clans
        .find_by_id(clan_id)
        .await?
        .is_some_and(|clan| clan.is_member(user_id)))
}

/// Participants may always look; clan members may look at their clan's games.
pub(crate) async fn authorize_viewer(
    clans: &dyn ClanRepository,
    session: &QuizSession,
    user_id: &UserId,
) -> Result<(), DomainError> {
    match session.authorize_view(user_id) {
        Ok(()) => Ok(()),
        Err(denied) => {
            if is_clan_member(clans, session, user_id).await? {
                Ok(())
            } else {
                Err(denied)
            }
        }
    }
}
