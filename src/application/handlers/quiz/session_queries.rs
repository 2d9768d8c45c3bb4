//! Read handlers for quiz sessions and their standings.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, QuizSessionId, UserId};
use crate::domain::quiz::{Question, QuizSession, RankedPlayer};
use crate::ports::{ClanRepository, QuestionRepository, QuizSessionRepository};

use super::{authorize_viewer, load_session};

#[derive(Debug, Clone)]
pub struct SessionWithQuestions {
    pub session: QuizSession,
    /// In play order.
    pub questions: Vec<Question>,
}

pub struct GetQuizSessionHandler {
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
    clans: Arc<dyn ClanRepository>,
}

impl GetQuizSessionHandler {
    pub fn new(
        sessions: Arc<dyn QuizSessionRepository>,
        questions: Arc<dyn QuestionRepository>,
        clans: Arc<dyn ClanRepository>,
    ) -> Self {
        Self {
            sessions,
            questions,
            clans,
        }
    }

    pub async fn handle(&self, id: &QuizSessionId, viewer: &UserId) -> Result<SessionWithQuestions, DomainError> {
        let session = load_session(self.sessions.as_ref(), id).await?;
        authorize_viewer(self.clans.as_ref(), &session, viewer).await?;

        let mut found = self.questions.find_by_ids(session.question_ids()).await?;
        let questions = session
            .question_ids()
            .iter()
            .filter_map(|qid| {
                let index = found.iter().position(|q| &q.id == qid)?;
                Some(found.swap_remove(index))
            })
            .collect();

        Ok(SessionWithQuestions { session, questions })
    }
}

#[derive(Debug, Clone)]
pub struct QuizResults {
    pub session_id: QuizSessionId,
    /// False while the session is still running; standings may change.
    pub is_final: bool,
    pub players: Vec<RankedPlayer>,
}

pub struct GetQuizResultsHandler {
    sessions: Arc<dyn QuizSessionRepository>,
    clans: Arc<dyn ClanRepository>,
}

impl GetQuizResultsHandler {
    pub fn new(sessions: Arc<dyn QuizSessionRepository>, clans: Arc<dyn ClanRepository>) -> Self {
        Self { sessions, clans }
    }

    pub async fn handle(&self, id: &QuizSessionId, viewer: &UserId) -> Result<QuizResults, DomainError> {
        let session = load_session(self.sessions.as_ref(), id).await?;
        authorize_viewer(self.clans.as_ref(), &session, viewer).await?;
        Ok(QuizResults {
            session_id: *session.id(),
            is_final: session.is_completed(),
            players: session.results(),
        })
    }
}
