//! SubmitAnswerHandler - scores one answer and stores it.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId, UserId};
use crate::domain::quiz::{AnswerOutcome, Participant, QuizMode};
use crate::ports::{ClanRepository, QuestionRepository, QuizSessionRepository};

use super::{is_clan_member, load_session};

#[derive(Debug, Clone)]
pub struct SubmitAnswerCommand {
    pub session_id: QuizSessionId,
    pub user_id: UserId,
    pub display_name: String,
    pub question_index: usize,
    pub selected_option: usize,
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AnsweredQuestion {
    pub outcome: AnswerOutcome,
    pub explanation: Option<String>,
}

pub struct SubmitAnswerHandler {
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
    clans: Arc<dyn ClanRepository>,
}

impl SubmitAnswerHandler {
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

    /// Clan members who are not yet participants join on their first answer.
    pub async fn handle(&self, cmd: SubmitAnswerCommand) -> Result<AnsweredQuestion, DomainError> {
        let mut session = load_session(self.sessions.as_ref(), &cmd.session_id).await?;

        if session.mode() == QuizMode::Clan
            && !session.is_participant(&cmd.user_id)
            && is_clan_member(self.clans.as_ref(), &session, &cmd.user_id).await?
        {
            let participant = Participant::new(cmd.user_id.clone(), cmd.display_name.clone());
            session.join(participant.clone())?;
            self.sessions.add_participant(&cmd.session_id, &participant).await?;
        }

        let question_id = *session.question_ids().get(cmd.question_index).ok_or_else(|| {
            DomainError::validation(
                "question_index",
                format!("Question index {} is out of range", cmd.question_index),
            )
        })?;
        let question = self
            .questions
            .find_by_ids(&[question_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::new(ErrorCode::QuestionNotFound, "Question not found"))?;

        let outcome = session.submit_answer(
            &cmd.user_id,
            cmd.question_index,
            &question,
            cmd.selected_option,
            cmd.time_taken_ms,
        )?;

        let answer = session
            .answers()
            .last()
            .ok_or_else(|| DomainError::internal("answer was not recorded"))?;
        let flag = if outcome.flagged {
            let flag = session.flags().last();
            tracing::warn!(
                session_id = %cmd.session_id,
                user_id = %cmd.user_id,
                question_index = cmd.question_index,
                time_taken_ms = answer.time_taken_ms,
                "Answer flagged as implausibly fast"
            );
            flag
        } else {
            None
        };
        self.sessions.record_answer(&cmd.session_id, answer, flag).await?;

        Ok(AnsweredQuestion {
            outcome,
            explanation: question.explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryClanRepository, InMemoryQuestionRepository, InMemoryQuizSessionRepository};
    use crate::application::handlers::quiz::test_support::bank;
    use crate::domain::clan::Clan;
    use crate::domain::quiz::QuizSession;

    struct Fixture {
        sessions: Arc<InMemoryQuizSessionRepository>,
        clans: Arc<InMemoryClanRepository>,
        handler: SubmitAnswerHandler,
        session: QuizSession,
    }

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    async fn solo_fixture() -> Fixture {
        let sessions = Arc::new(InMemoryQuizSessionRepository::new());
        let questions = Arc::new(InMemoryQuestionRepository::new());
        let clans = Arc::new(InMemoryClanRepository::new());
        let bank = bank("physics", 3);
        questions.save_all(&bank).await.unwrap();
        let session = QuizSession::solo(
            Participant::new(uid("solo"), "Solo"),
            bank.iter().map(|q| q.id).collect(),
            20,
        )
        .unwrap();
        sessions.save(&session).await.unwrap();
        let handler = SubmitAnswerHandler::new(sessions.clone(), questions, clans.clone());
        Fixture {
            sessions,
            clans,
            handler,
            session,
        }
    }

    fn answer(f: &Fixture, user: &str, index: usize, option: usize, ms: u64) -> SubmitAnswerCommand {
        SubmitAnswerCommand {
            session_id: *f.session.id(),
            user_id: uid(user),
            display_name: user.to_string(),
            question_index: index,
            selected_option: option,
            time_taken_ms: ms,
        }
    }

    #[tokio::test]
    async fn correct_answer_scores_and_is_stored() {
        let f = solo_fixture().await;

        let answered = f.handler.handle(answer(&f, "solo", 0, 1, 5_000)).await.unwrap();

        assert!(answered.outcome.correct);
        assert!(answered.outcome.points > 0);
        assert!(!answered.outcome.flagged);
        let stored = f.sessions.find_by_id(f.session.id()).await.unwrap().unwrap();
        assert_eq!(stored.answers().len(), 1);
    }

    #[tokio::test]
    async fn second_answer_to_the_same_question_is_rejected() {
        let f = solo_fixture().await;
        f.handler.handle(answer(&f, "solo", 0, 0, 5_000)).await.unwrap();

        let err = f.handler.handle(answer(&f, "solo", 0, 1, 5_000)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyAnswered);
    }

    #[tokio::test]
    async fn implausibly_fast_answers_count_but_are_flagged() {
        let f = solo_fixture().await;

        let answered = f.handler.handle(answer(&f, "solo", 1, 1, 50)).await.unwrap();

        assert!(answered.outcome.flagged);
        assert!(answered.outcome.correct);
        let stored = f.sessions.find_by_id(f.session.id()).await.unwrap().unwrap();
        assert_eq!(stored.flags().len(), 1);
    }

    #[tokio::test]
    async fn outsiders_cannot_answer() {
        let f = solo_fixture().await;
        let err = f.handler.handle(answer(&f, "intruder", 0, 1, 5_000)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn clan_members_join_on_first_answer() {
        let f = solo_fixture().await;
        let mut clan = Clan::create(uid("owner"), "Owner", "Physics Club", None).unwrap();
        clan.join(uid("member"), "Member").unwrap();
        f.clans.save(&clan).await.unwrap();
        let session = QuizSession::for_clan(
            *clan.id(),
            Participant::new(uid("owner"), "Owner"),
            f.session.question_ids().to_vec(),
            20,
        )
        .unwrap();
        f.sessions.save(&session).await.unwrap();

        let cmd = SubmitAnswerCommand {
            session_id: *session.id(),
            ..answer(&f, "member", 0, 1, 4_000)
        };
        f.handler.handle(cmd).await.unwrap();

        let stored = f.sessions.find_by_id(session.id()).await.unwrap().unwrap();
        assert!(stored.is_participant(&uid("member")));
    }
}
