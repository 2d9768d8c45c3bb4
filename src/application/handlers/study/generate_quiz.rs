//! GenerateQuizHandler - model-written questions, deduplicated against what the
//! player has already seen, saved to the bank.

use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::progress::ProgressRecorder;
use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, UserId};
use crate::domain::progression::{AchievementContext, AchievementId};
use crate::domain::quiz::dedup::{filter_unique, DEFAULT_SIMILARITY_THRESHOLD};
use crate::domain::quiz::{Difficulty, Question};
use crate::domain::study::parsing::parse_quiz;
use crate::domain::study::prompts::{quiz_prompt, QUIZ_SYSTEM_PROMPT};
use crate::domain::study::MAX_GENERATED_QUESTIONS;
use crate::ports::{AIProvider, CompletionRequest, MessageRole, QuestionRepository, RequestMetadata};

use super::{prepare_source, validate_topic, GenerationQuota};

/// How much served-question history is compared against.
const HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct GenerateQuizCommand {
    pub user_id: UserId,
    pub display_name: String,
    pub topic: String,
    pub source_text: Option<String>,
    pub count: u32,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuiz {
    pub questions: Vec<Question>,
    pub new_achievements: Vec<AchievementId>,
}

impl GeneratedQuiz {
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }
}

pub struct GenerateQuizHandler {
    ai: Arc<dyn AIProvider>,
    questions: Arc<dyn QuestionRepository>,
    quota: Arc<GenerationQuota>,
    progress: Arc<ProgressRecorder>,
    max_source_chars: usize,
}

impl GenerateQuizHandler {
    pub fn new(
        ai: Arc<dyn AIProvider>,
        questions: Arc<dyn QuestionRepository>,
        quota: Arc<GenerationQuota>,
        progress: Arc<ProgressRecorder>,
        max_source_chars: usize,
    ) -> Self {
        Self {
            ai,
            questions,
            quota,
            progress,
            max_source_chars,
        }
    }

    pub async fn handle(&self, cmd: GenerateQuizCommand) -> Result<GeneratedQuiz, DomainError> {
        let topic = validate_topic(&cmd.topic)?;
        if !(1..=MAX_GENERATED_QUESTIONS).contains(&cmd.count) {
            return Err(DomainError::validation(
                "count",
                format!("Count must be between 1 and {}", MAX_GENERATED_QUESTIONS),
            ));
        }
        let source = prepare_source(cmd.source_text.as_deref(), self.max_source_chars)?;
        self.quota.consume(&cmd.user_id).await?;

        let history = self
            .questions
            .recent_served_texts(&cmd.user_id, HISTORY_LIMIT)
            .await?;

        let request = CompletionRequest::new(RequestMetadata::new(cmd.user_id.clone(), "study_quiz"))
            .with_system_prompt(QUIZ_SYSTEM_PROMPT)
            .with_message(
                MessageRole::User,
                quiz_prompt(&topic, cmd.count, cmd.difficulty, source.as_deref(), &history),
            )
            .with_temperature(0.7)
            .expecting_json();
        let response = self.ai.complete(request).await?;
        let drafts = parse_quiz(&response.content, &topic, cmd.difficulty)?;

        let drafted = drafts.len();
        let valid: Vec<Question> = drafts
            .into_iter()
            .filter_map(|draft| match Question::create(draft, Some(cmd.user_id.clone())) {
                Ok(q) => Some(q),
                Err(e) => {
                    tracing::debug!(error = %e, "Dropping malformed generated question");
                    None
                }
            })
            .collect();

        let mut questions = filter_unique(valid, &history, DEFAULT_SIMILARITY_THRESHOLD, |q| q.text.as_str());
        questions.truncate(cmd.count as usize);
        if questions.is_empty() {
            return Err(DomainError::new(
                ErrorCode::AIProviderError,
                "Model returned no usable questions",
            ));
        }

        self.questions.save_all(&questions).await?;
        let ids: Vec<QuestionId> = questions.iter().map(|q| q.id).collect();
        self.questions.record_served(&cmd.user_id, &ids).await?;

        let update = self
            .progress
            .record_milestone(
                &cmd.user_id,
                &cmd.display_name,
                AchievementContext {
                    generated_study_set: true,
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            model = %response.model,
            drafted,
            kept = questions.len(),
            "Quiz questions generated"
        );
        Ok(GeneratedQuiz {
            questions,
            new_achievements: update.unlocked_ids(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::memory::{InMemoryAchievementRepository, InMemoryPlayerStatsRepository, InMemoryQuestionRepository};
    use crate::application::handlers::study::quota::test_support::quota_with_daily_limit;

    fn handler(ai: MockAIProvider, questions: Arc<InMemoryQuestionRepository>) -> GenerateQuizHandler {
        let progress = ProgressRecorder::new(
            Arc::new(InMemoryPlayerStatsRepository::new()),
            Arc::new(InMemoryAchievementRepository::new()),
        );
        GenerateQuizHandler::new(
            Arc::new(ai),
            questions,
            Arc::new(quota_with_daily_limit(10)),
            Arc::new(progress),
            2_000,
        )
    }

    fn command(count: u32) -> GenerateQuizCommand {
        GenerateQuizCommand {
            user_id: UserId::new("u1").unwrap(),
            display_name: "Ada".to_string(),
            topic: "Astronomy".to_string(),
            source_text: None,
            count,
            difficulty: Difficulty::Easy,
        }
    }

    const BATCH: &str = r#"{"questions": [
        {"question": "Which planet is closest to the Sun?", "options": ["Mercury", "Venus", "Mars", "Earth"], "correct_index": 0},
        {"question": "Which planet is the closest one to the Sun?", "options": ["Venus", "Mercury", "Mars", "Earth"], "correct_index": 1},
        {"question": "What is the largest planet in the solar system?", "options": ["Saturn", "Jupiter"], "correct_index": 1},
        {"question": "Broken question with one option", "options": ["Only"], "correct_index": 0}
    ]}"#;

    #[tokio::test]
    async fn malformed_and_repeated_questions_are_dropped() {
        let questions = Arc::new(InMemoryQuestionRepository::new());
        let generated = handler(MockAIProvider::new().with_response(BATCH), questions.clone())
            .handle(command(5))
            .await
            .unwrap();

        assert_eq!(generated.questions.len(), 2);
        assert!(generated.questions.iter().all(|q| q.difficulty == Difficulty::Easy));
        assert_eq!(generated.new_achievements, vec![AchievementId::Scholar]);

        let stored = questions.find_by_ids(&generated.question_ids()).await.unwrap();
        assert_eq!(stored.len(), 2);
        let served = questions
            .recent_served_texts(&UserId::new("u1").unwrap(), 10)
            .await
            .unwrap();
        assert_eq!(served.len(), 2);
    }

    #[tokio::test]
    async fn previously_served_questions_are_not_repeated() {
        let questions = Arc::new(InMemoryQuestionRepository::new());
        let ai = MockAIProvider::new().with_response(BATCH).with_response(BATCH);
        let handler = handler(ai.clone(), questions);

        handler.handle(command(5)).await.unwrap();
        let err = handler.handle(command(5)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AIProviderError);
        let second_prompt = &ai.calls()[1].messages[0].content;
        assert!(second_prompt.contains("Which planet is closest to the Sun?"));
    }

    #[tokio::test]
    async fn result_is_cut_to_the_requested_count() {
        let questions = Arc::new(InMemoryQuestionRepository::new());
        let generated = handler(MockAIProvider::new().with_response(BATCH), questions)
            .handle(command(1))
            .await
            .unwrap();
        assert_eq!(generated.questions.len(), 1);
    }

    #[tokio::test]
    async fn count_is_bounded() {
        let ai = MockAIProvider::new();
        let handler = handler(ai.clone(), Arc::new(InMemoryQuestionRepository::new()));
        for count in [0, MAX_GENERATED_QUESTIONS + 1] {
            let err = handler.handle(command(count)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
        }
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_failure_maps_to_provider_error() {
        let ai = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        });
        let err = handler(ai, Arc::new(InMemoryQuestionRepository::new()))
            .handle(command(3))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AIProviderError);
    }
}
