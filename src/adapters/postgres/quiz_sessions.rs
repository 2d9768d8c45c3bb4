//! PostgreSQL implementation of QuizSessionRepository.
//!
//! A session spans four tables: the header row, participants, answers and
//! anti-cheat flags. Answers carry a primary key on
//! (session, user, question_index), which is what enforces one answer per
//! question per player.
//!
//! Writes that extend a session take a share lock on the header row and
//! refuse unless it is still active. Completion is a conditional update on
//! the same row, so an answer either lands before completion or is refused.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{ClanId, DomainError, ErrorCode, QuestionId, QuizSessionId, RoomId, Timestamp};
use crate::domain::quiz::{FlaggedAnswer, Participant, QuizAnswer, QuizMode, QuizSession, QuizStatus};
use crate::ports::QuizSessionRepository;

use super::{corrupt, db_error, label, user_id, violates};

pub struct PostgresQuizSessionRepository {
    pool: PgPool,
}

impl PostgresQuizSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    mode: String,
    room_id: Option<Uuid>,
    clan_id: Option<Uuid>,
    host_id: String,
    question_ids: Vec<Uuid>,
    time_limit_secs: i32,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
    user_id: String,
    display_name: String,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerRow {
    user_id: String,
    question_index: i32,
    question_id: Uuid,
    selected_option: i32,
    correct: bool,
    points: i32,
    time_taken_ms: i64,
    answered_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FlagRow {
    user_id: String,
    question_index: i32,
    time_taken_ms: i64,
    reason: String,
    flagged_at: DateTime<Utc>,
}

fn already_completed() -> DomainError {
    DomainError::new(ErrorCode::InvalidStateTransition, "Quiz session is already completed")
}

/// Share-locks the session header for the rest of `tx`, failing unless it is active.
async fn lock_active(tx: &mut Transaction<'_, Postgres>, id: &QuizSessionId) -> Result<(), DomainError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM quiz_sessions WHERE id = $1 FOR SHARE")
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("lock quiz session"))?;
    match status.as_deref() {
        None => Err(DomainError::new(ErrorCode::QuizSessionNotFound, "Quiz session not found")),
        Some(status) if status == QuizStatus::Active.as_str() => Ok(()),
        Some(_) => Err(already_completed()),
    }
}

fn non_negative<T: TryFrom<i64>>(what: &str, value: i64) -> Result<T, DomainError> {
    T::try_from(value).map_err(|_| corrupt(what, value))
}

impl TryFrom<AnswerRow> for QuizAnswer {
    type Error = DomainError;

    fn try_from(row: AnswerRow) -> Result<Self, Self::Error> {
        Ok(QuizAnswer {
            user_id: user_id(row.user_id)?,
            question_index: non_negative("question_index", row.question_index.into())?,
            question_id: QuestionId::from_uuid(row.question_id),
            selected_option: non_negative("selected_option", row.selected_option.into())?,
            correct: row.correct,
            points: non_negative("points", row.points.into())?,
            time_taken_ms: non_negative("time_taken_ms", row.time_taken_ms)?,
            answered_at: Timestamp::from_datetime(row.answered_at),
        })
    }
}

impl TryFrom<FlagRow> for FlaggedAnswer {
    type Error = DomainError;

    fn try_from(row: FlagRow) -> Result<Self, Self::Error> {
        Ok(FlaggedAnswer {
            user_id: user_id(row.user_id)?,
            question_index: non_negative("question_index", row.question_index.into())?,
            time_taken_ms: non_negative("time_taken_ms", row.time_taken_ms)?,
            reason: row.reason,
            flagged_at: Timestamp::from_datetime(row.flagged_at),
        })
    }
}

#[async_trait]
impl QuizSessionRepository for PostgresQuizSessionRepository {
    async fn save(&self, session: &QuizSession) -> Result<(), DomainError> {
        let question_ids: Vec<Uuid> = session.question_ids().iter().map(|id| *id.as_uuid()).collect();
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO quiz_sessions (
                id, mode, room_id, clan_id, host_id, question_ids, time_limit_secs,
                status, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.mode().as_str())
        .bind(session.room_id().map(|id| *id.as_uuid()))
        .bind(session.clan_id().map(|id| *id.as_uuid()))
        .bind(session.host_id().as_str())
        .bind(&question_ids)
        .bind(session.time_limit_secs() as i32)
        .bind(session.status().as_str())
        .bind(session.created_at().as_datetime())
        .bind(session.completed_at().map(|t| *t.as_datetime()))
        .execute(&mut *tx)
        .await
        .map_err(db_error("insert quiz session"))?;

        for participant in session.participants() {
            sqlx::query(
                r#"
                INSERT INTO quiz_participants (session_id, user_id, display_name, joined_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(session.id().as_uuid())
            .bind(participant.user_id.as_str())
            .bind(&participant.display_name)
            .bind(participant.joined_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert quiz participant"))?;
        }

        tx.commit().await.map_err(db_error("commit quiz session"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &QuizSessionId) -> Result<Option<QuizSession>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, mode, room_id, clan_id, host_id, question_ids, time_limit_secs,
                   status, created_at, completed_at
            FROM quiz_sessions WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find quiz session"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let participants: Vec<ParticipantRow> = sqlx::query_as(
            "SELECT user_id, display_name, joined_at FROM quiz_participants WHERE session_id = $1 ORDER BY joined_at, user_id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load quiz participants"))?;

        let answers: Vec<AnswerRow> = sqlx::query_as(
            r#"
            SELECT user_id, question_index, question_id, selected_option, correct, points,
                   time_taken_ms, answered_at
            FROM quiz_answers WHERE session_id = $1
            ORDER BY answered_at, user_id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load quiz answers"))?;

        let flags: Vec<FlagRow> = sqlx::query_as(
            "SELECT user_id, question_index, time_taken_ms, reason, flagged_at FROM flagged_answers WHERE session_id = $1 ORDER BY flagged_at",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load flagged answers"))?;

        let participants = participants
            .into_iter()
            .map(|p| {
                Ok(Participant {
                    user_id: user_id(p.user_id)?,
                    display_name: p.display_name,
                    joined_at: Timestamp::from_datetime(p.joined_at),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Some(QuizSession::reconstitute(
            QuizSessionId::from_uuid(row.id),
            label("quiz mode", &row.mode, QuizMode::parse)?,
            row.room_id.map(RoomId::from_uuid),
            row.clan_id.map(ClanId::from_uuid),
            user_id(row.host_id)?,
            row.question_ids.into_iter().map(QuestionId::from_uuid).collect(),
            non_negative("time_limit_secs", row.time_limit_secs.into())?,
            participants,
            answers
                .into_iter()
                .map(QuizAnswer::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            flags
                .into_iter()
                .map(FlaggedAnswer::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            label("quiz status", &row.status, QuizStatus::parse)?,
            Timestamp::from_datetime(row.created_at),
            row.completed_at.map(Timestamp::from_datetime),
        )))
    }

    async fn add_participant(&self, id: &QuizSessionId, participant: &Participant) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_active(&mut tx, id).await?;

        sqlx::query(
            r#"
            INSERT INTO quiz_participants (session_id, user_id, display_name, joined_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id, user_id) DO NOTHING
            "#,
        )
        .bind(id.as_uuid())
        .bind(participant.user_id.as_str())
        .bind(&participant.display_name)
        .bind(participant.joined_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("add quiz participant"))?;

        tx.commit().await.map_err(db_error("commit quiz participant"))?;
        Ok(())
    }

    async fn record_answer(
        &self,
        id: &QuizSessionId,
        answer: &QuizAnswer,
        flag: Option<&FlaggedAnswer>,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_active(&mut tx, id).await?;

        sqlx::query(
            r#"
            INSERT INTO quiz_answers (
                session_id, user_id, question_index, question_id, selected_option,
                correct, points, time_taken_ms, answered_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id.as_uuid())
        .bind(answer.user_id.as_str())
        .bind(answer.question_index as i32)
        .bind(answer.question_id.as_uuid())
        .bind(answer.selected_option as i32)
        .bind(answer.correct)
        .bind(answer.points as i32)
        .bind(answer.time_taken_ms as i64)
        .bind(answer.answered_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "quiz_answers_pkey") {
                DomainError::new(ErrorCode::AlreadyAnswered, "Question already answered")
            } else {
                db_error("insert quiz answer")(e)
            }
        })?;

        if let Some(flag) = flag {
            sqlx::query(
                r#"
                INSERT INTO flagged_answers (session_id, user_id, question_index, time_taken_ms, reason, flagged_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_uuid())
            .bind(flag.user_id.as_str())
            .bind(flag.question_index as i32)
            .bind(flag.time_taken_ms as i64)
            .bind(&flag.reason)
            .bind(flag.flagged_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert flagged answer"))?;
        }

        tx.commit().await.map_err(db_error("commit answer"))?;
        Ok(())
    }

    async fn mark_completed(&self, session: &QuizSession) -> Result<(), DomainError> {
        let completed_at = session.completed_at().copied().unwrap_or_else(Timestamp::now);
        let result = sqlx::query(
            "UPDATE quiz_sessions SET status = $2, completed_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(session.id().as_uuid())
        .bind(QuizStatus::Completed.as_str())
        .bind(completed_at.as_datetime())
        .bind(QuizStatus::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("complete quiz session"))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM quiz_sessions WHERE id = $1)")
            .bind(session.id().as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("find quiz session"))?;
        if exists {
            Err(already_completed())
        } else {
            Err(DomainError::new(ErrorCode::QuizSessionNotFound, "Quiz session not found"))
        }
    }
}
