//! PostgreSQL implementation of QuestionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, QuestionId, Timestamp, UserId};
use crate::domain::quiz::{Difficulty, Question};
use crate::ports::QuestionRepository;

use super::{corrupt, db_error, user_id};

const SELECT_QUESTION: &str = r#"
    SELECT id, topic, text, options, correct_option, difficulty, explanation, created_by, created_at
    FROM questions
"#;

pub struct PostgresQuestionRepository {
    pool: PgPool,
}

impl PostgresQuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    topic: String,
    text: String,
    options: Vec<String>,
    correct_option: i32,
    difficulty: String,
    explanation: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = DomainError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let correct_option =
            usize::try_from(row.correct_option).map_err(|_| corrupt("correct_option", row.correct_option))?;
        if correct_option >= row.options.len() {
            return Err(corrupt("correct_option", row.correct_option));
        }
        Ok(Question {
            id: QuestionId::from_uuid(row.id),
            topic: row.topic,
            text: row.text,
            options: row.options,
            correct_option,
            difficulty: row
                .difficulty
                .parse::<Difficulty>()
                .map_err(|e| corrupt("difficulty", e))?,
            explanation: row.explanation,
            created_by: row.created_by.map(user_id).transpose()?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl QuestionRepository for PostgresQuestionRepository {
    async fn save_all(&self, questions: &[Question]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        for question in questions {
            sqlx::query(
                r#"
                INSERT INTO questions (
                    id, topic, text, options, correct_option, difficulty, explanation, created_by, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(question.id.as_uuid())
            .bind(&question.topic)
            .bind(&question.text)
            .bind(&question.options)
            .bind(question.correct_option as i32)
            .bind(question.difficulty.as_str())
            .bind(&question.explanation)
            .bind(question.created_by.as_ref().map(UserId::as_str))
            .bind(question.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert question"))?;
        }
        tx.commit().await.map_err(db_error("commit questions"))?;
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[QuestionId]) -> Result<Vec<Question>, DomainError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let sql = format!("{} WHERE id = ANY($1)", SELECT_QUESTION);
        let rows: Vec<QuestionRow> = sqlx::query_as(&sql)
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find questions"))?;

        let mut by_id: HashMap<Uuid, Question> = HashMap::new();
        for row in rows {
            let question = Question::try_from(row)?;
            by_id.insert(*question.id.as_uuid(), question);
        }
        // Preserve the caller's order; quiz sessions index questions by position.
        Ok(uuids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    async fn sample_by_topic(&self, topic: &str, limit: u32) -> Result<Vec<Question>, DomainError> {
        let sql = format!(
            "{} WHERE lower(topic) = lower($1) ORDER BY random() LIMIT $2",
            SELECT_QUESTION
        );
        let rows: Vec<QuestionRow> = sqlx::query_as(&sql)
            .bind(topic.trim())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("sample questions"))?;
        rows.into_iter().map(Question::try_from).collect()
    }

    async fn record_served(&self, user_id: &UserId, ids: &[QuestionId]) -> Result<(), DomainError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        sqlx::query(
            r#"
            INSERT INTO served_questions (user_id, question_id, served_at)
            SELECT $1, q, now() FROM UNNEST($2::uuid[]) AS q
            ON CONFLICT (user_id, question_id) DO UPDATE SET served_at = EXCLUDED.served_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(&uuids)
        .execute(&self.pool)
        .await
        .map_err(db_error("record served questions"))?;
        Ok(())
    }

    async fn recent_served_texts(&self, user_id: &UserId, limit: u32) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT q.text
            FROM served_questions s
            JOIN questions q ON q.id = s.question_id
            WHERE s.user_id = $1
            ORDER BY s.served_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load served questions"))?;
        Ok(rows.into_iter().map(|(text,)| text).collect())
    }
}
