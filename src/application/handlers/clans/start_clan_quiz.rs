//! StartClanQuizHandler - a moderator opens a quiz for the whole clan.

use std::sync::Arc;

use crate::application::handlers::quiz::{select_questions, QuestionSelection};
use crate::domain::foundation::{ClanId, DomainError, QuestionId, UserId};
use crate::domain::quiz::{Participant, QuizSession, DEFAULT_TIME_LIMIT_SECS};
use crate::ports::{ClanRepository, QuestionRepository, QuizSessionRepository};

use super::load_clan;

#[derive(Debug, Clone)]
pub struct StartClanQuizCommand {
    pub clan_id: ClanId,
    pub user_id: UserId,
    pub topic: Option<String>,
    pub question_ids: Option<Vec<QuestionId>>,
    pub count: Option<u32>,
    pub time_limit_secs: Option<u32>,
}

pub struct StartClanQuizHandler {
    clans: Arc<dyn ClanRepository>,
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl StartClanQuizHandler {
    pub fn new(
        clans: Arc<dyn ClanRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clans,
            sessions,
            questions,
        }
    }

    /// Other members join the session by answering.
    pub async fn handle(&self, cmd: StartClanQuizCommand) -> Result<QuizSession, DomainError> {
        let clan = load_clan(self.clans.as_ref(), &cmd.clan_id).await?;
        clan.authorize_moderator(&cmd.user_id)?;
        let host_name = clan
            .member(&cmd.user_id)
            .map(|m| m.display_name.clone())
            .unwrap_or_default();

        let selection = QuestionSelection::from_request(cmd.question_ids, cmd.topic, cmd.count)?;
        let question_ids = select_questions(self.questions.as_ref(), selection).await?;

        let session = QuizSession::for_clan(
            *clan.id(),
            Participant::new(cmd.user_id.clone(), host_name),
            question_ids,
            cmd.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        )?;
        self.sessions.save(&session).await?;
        self.questions
            .record_served(&cmd.user_id, session.question_ids())
            .await?;

        tracing::info!(clan_id = %clan.id(), session_id = %session.id(), "Clan quiz started");
        Ok(session)
    }
}
