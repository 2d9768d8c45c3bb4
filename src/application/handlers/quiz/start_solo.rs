//! StartSoloQuizHandler - a practice session with a single player.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, QuestionId, UserId};
use crate::domain::quiz::{Participant, QuizSession, DEFAULT_TIME_LIMIT_SECS};
use crate::ports::{QuestionRepository, QuizSessionRepository};

use super::{select_questions, QuestionSelection};

#[derive(Debug, Clone)]
pub struct StartSoloQuizCommand {
    pub user_id: UserId,
    pub display_name: String,
    pub topic: Option<String>,
    pub question_ids: Option<Vec<QuestionId>>,
    pub count: Option<u32>,
    pub time_limit_secs: Option<u32>,
}

pub struct StartSoloQuizHandler {
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl StartSoloQuizHandler {
    pub fn new(sessions: Arc<dyn QuizSessionRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { sessions, questions }
    }

    pub async fn handle(&self, cmd: StartSoloQuizCommand) -> Result<QuizSession, DomainError> {
        let selection = QuestionSelection::from_request(cmd.question_ids, cmd.topic, cmd.count)?;
        let question_ids = select_questions(self.questions.as_ref(), selection).await?;

        let session = QuizSession::solo(
            Participant::new(cmd.user_id.clone(), cmd.display_name),
            question_ids,
            cmd.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        )?;
        self.sessions.save(&session).await?;
        self.questions
            .record_served(&cmd.user_id, session.question_ids())
            .await?;

        tracing::debug!(session_id = %session.id(), user_id = %cmd.user_id, "Solo quiz started");
        Ok(session)
    }
}
