//! In-memory question bank.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, QuestionId, UserId};
use crate::domain::quiz::Question;
use crate::ports::QuestionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<QuestionId, Question>>>,
    /// Served question ids per user, oldest first.
    served: Arc<RwLock<HashMap<UserId, Vec<QuestionId>>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn save_all(&self, questions: &[Question]) -> Result<(), DomainError> {
        let mut stored = self.questions.write().await;
        for question in questions {
            stored.insert(question.id, question.clone());
        }
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[QuestionId]) -> Result<Vec<Question>, DomainError> {
        let stored = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| stored.get(id).cloned()).collect())
    }

    async fn sample_by_topic(&self, topic: &str, limit: u32) -> Result<Vec<Question>, DomainError> {
        let stored = self.questions.read().await;
        let topic = topic.trim();
        // v4 ids are random, so id order is a shuffle
        let mut matching: Vec<Question> = stored
            .values()
            .filter(|q| q.topic.eq_ignore_ascii_case(topic))
            .cloned()
            .collect();
        matching.sort_by_key(|q| q.id);
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn record_served(&self, user_id: &UserId, ids: &[QuestionId]) -> Result<(), DomainError> {
        let mut served = self.served.write().await;
        served.entry(user_id.clone()).or_default().extend_from_slice(ids);
        Ok(())
    }

    async fn recent_served_texts(&self, user_id: &UserId, limit: u32) -> Result<Vec<String>, DomainError> {
        let served = self.served.read().await;
        let questions = self.questions.read().await;
        Ok(served
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .rev()
                    .filter_map(|id| questions.get(id).map(|q| q.text.clone()))
                    .take(limit as usize)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quiz::{Difficulty, QuestionDraft};

    fn question(topic: &str, text: &str) -> Question {
        Question::create(
            QuestionDraft {
                topic: topic.to_string(),
                text: text.to_string(),
                options: vec!["yes".to_string(), "no".to_string()],
                correct_option: 0,
                difficulty: Difficulty::Easy,
                explanation: None,
            },
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sample_matches_topic_case_insensitively() {
        let repo = InMemoryQuestionRepository::new();
        repo.save_all(&[
            question("Biology", "Is a virus alive?"),
            question("biology", "Do plants breathe?"),
            question("History", "Was Rome built in a day?"),
        ])
        .await
        .unwrap();

        assert_eq!(repo.sample_by_topic("BIOLOGY", 10).await.unwrap().len(), 2);
        assert_eq!(repo.sample_by_topic("biology", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn served_texts_are_newest_first() {
        let repo = InMemoryQuestionRepository::new();
        let first = question("Math", "Is two prime?");
        let second = question("Math", "Is nine prime?");
        repo.save_all(&[first.clone(), second.clone()]).await.unwrap();

        let user = UserId::new("u1").unwrap();
        repo.record_served(&user, &[first.id]).await.unwrap();
        repo.record_served(&user, &[second.id]).await.unwrap();

        let texts = repo.recent_served_texts(&user, 10).await.unwrap();
        assert_eq!(texts, vec!["Is nine prime?".to_string(), "Is two prime?".to_string()]);
        assert!(repo
            .recent_served_texts(&UserId::new("u2").unwrap(), 10)
            .await
            .unwrap()
            .is_empty());
    }
}
