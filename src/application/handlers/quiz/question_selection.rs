//! Picks the questions a new quiz session will play.

use crate::domain::foundation::{DomainError, ErrorCode, QuestionId};
use crate::domain::quiz::MAX_QUESTIONS;
use crate::ports::QuestionRepository;

pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Either an explicit list or a random draw from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSelection {
    Topic { topic: String, count: u32 },
    Explicit(Vec<QuestionId>),
}

impl QuestionSelection {
    /// Explicit ids win; otherwise a topic is required.
    pub fn from_request(
        question_ids: Option<Vec<QuestionId>>,
        topic: Option<String>,
        count: Option<u32>,
    ) -> Result<Self, DomainError> {
        if let Some(ids) = question_ids.filter(|ids| !ids.is_empty()) {
            return Ok(QuestionSelection::Explicit(ids));
        }
        let topic = topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::validation("topic", "Provide a topic or question ids"))?;
        Ok(QuestionSelection::Topic {
            topic,
            count: count.unwrap_or(DEFAULT_QUESTION_COUNT),
        })
    }
}

/// Resolves a selection to ordered question ids.
///
/// A topic draw with fewer stored questions than requested plays what there is.
pub async fn select_questions(
    questions: &dyn QuestionRepository,
    selection: QuestionSelection,
) -> Result<Vec<QuestionId>, DomainError> {
    match selection {
        QuestionSelection::Explicit(ids) => {
            if ids.len() > MAX_QUESTIONS {
                return Err(too_many());
            }
            let found = questions.find_by_ids(&ids).await?;
            if let Some(missing) = ids.iter().find(|id| !found.iter().any(|q| &q.id == *id)) {
                return Err(DomainError::new(ErrorCode::QuestionNotFound, "Question not found")
                    .with_detail("question_id", missing.to_string()));
            }
            Ok(ids)
        }
        QuestionSelection::Topic { topic, count } => {
            if count == 0 || count as usize > MAX_QUESTIONS {
                return Err(too_many());
            }
            let drawn = questions.sample_by_topic(&topic, count).await?;
            if drawn.is_empty() {
                return Err(DomainError::validation(
                    "topic",
                    format!("No questions available for '{}'", topic),
                ));
            }
            if (drawn.len() as u32) < count {
                tracing::debug!(topic = %topic, requested = count, available = drawn.len(), "Short question draw");
            }
            Ok(drawn.into_iter().map(|q| q.id).collect())
        }
    }
}

fn too_many() -> DomainError {
    DomainError::validation(
        "count",
        format!("A quiz has between 1 and {} questions", MAX_QUESTIONS),
    )
}
