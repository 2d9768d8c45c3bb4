//! Question bank and served-question history.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, QuestionId, UserId};
use crate::domain::quiz::Question;

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn save_all(&self, questions: &[Question]) -> Result<(), DomainError>;

    /// Loads questions by id. Missing ids are skipped; order is unspecified.
    async fn find_by_ids(&self, ids: &[QuestionId]) -> Result<Vec<Question>, DomainError>;

    /// Up to `limit` random questions on a topic (case-insensitive match).
    async fn sample_by_topic(&self, topic: &str, limit: u32) -> Result<Vec<Question>, DomainError>;

    /// Notes that these questions were delivered to a user.
    async fn record_served(&self, user_id: &UserId, ids: &[QuestionId]) -> Result<(), DomainError>;

    /// Text of the questions most recently served to a user, newest first.
    async fn recent_served_texts(&self, user_id: &UserId, limit: u32) -> Result<Vec<String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn QuestionRepository) {}
    }
}
