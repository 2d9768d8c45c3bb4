//! In-memory quiz session store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId};
use crate::domain::quiz::{FlaggedAnswer, Participant, QuizAnswer, QuizSession};
use crate::ports::QuizSessionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryQuizSessionRepository {
    sessions: Arc<RwLock<HashMap<QuizSessionId, QuizSession>>>,
}

impl InMemoryQuizSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::QuizSessionNotFound, "Quiz session not found")
}

fn ensure_active(session: &QuizSession) -> Result<(), DomainError> {
    if session.is_completed() {
        return Err(DomainError::new(
            ErrorCode::InvalidStateTransition,
            "Quiz session is already completed",
        ));
    }
    Ok(())
}

/// Stored rows with header fields (status, completion) taken from `header`.
fn rebuild(
    header: &QuizSession,
    participants: Vec<Participant>,
    answers: Vec<QuizAnswer>,
    flags: Vec<FlaggedAnswer>,
) -> QuizSession {
    QuizSession::reconstitute(
        *header.id(),
        header.mode(),
        header.room_id().copied(),
        header.clan_id().copied(),
        header.host_id().clone(),
        header.question_ids().to_vec(),
        header.time_limit_secs(),
        participants,
        answers,
        flags,
        header.status(),
        *header.created_at(),
        header.completed_at().copied(),
    )
}

#[async_trait]
impl QuizSessionRepository for InMemoryQuizSessionRepository {
    async fn save(&self, session: &QuizSession) -> Result<(), DomainError> {
        self.sessions.write().await.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &QuizSessionId) -> Result<Option<QuizSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn add_participant(&self, id: &QuizSessionId, participant: &Participant) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get(id).ok_or_else(not_found)?;
        ensure_active(session)?;
        if session.is_participant(&participant.user_id) {
            return Ok(());
        }
        let mut participants = session.participants().to_vec();
        participants.push(participant.clone());
        let updated = rebuild(
            session,
            participants,
            session.answers().to_vec(),
            session.flags().to_vec(),
        );
        sessions.insert(*id, updated);
        Ok(())
    }

    async fn record_answer(
        &self,
        id: &QuizSessionId,
        answer: &QuizAnswer,
        flag: Option<&FlaggedAnswer>,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get(id).ok_or_else(not_found)?;
        ensure_active(session)?;

        let duplicate = session
            .answers()
            .iter()
            .any(|a| a.user_id == answer.user_id && a.question_index == answer.question_index);
        if duplicate {
            return Err(DomainError::new(ErrorCode::AlreadyAnswered, "Question already answered"));
        }

        let mut answers = session.answers().to_vec();
        answers.push(answer.clone());
        let mut flags = session.flags().to_vec();
        flags.extend(flag.cloned());

        let updated = rebuild(session, session.participants().to_vec(), answers, flags);
        sessions.insert(*id, updated);
        Ok(())
    }

    async fn mark_completed(&self, session: &QuizSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get(session.id()).ok_or_else(not_found)?;
        ensure_active(stored)?;
        let updated = rebuild(
            session,
            stored.participants().to_vec(),
            stored.answers().to_vec(),
            stored.flags().to_vec(),
        );
        sessions.insert(*session.id(), updated);
        Ok(())
    }
}
