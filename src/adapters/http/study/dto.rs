//! Request and response bodies for `/api/study`.

use serde::{Deserialize, Serialize};

use crate::adapters::http::quiz::QuestionResponse;
use crate::application::handlers::study::GeneratedQuiz;
use crate::domain::progression::AchievementId;
use crate::domain::quiz::Difficulty;
use crate::domain::study::NoteDetail;

/// Questions per request when the client does not say.
pub const DEFAULT_GENERATED_COUNT: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateNotesRequest {
    pub topic: String,
    #[serde(default)]
    pub source_text: Option<String>,
    #[serde(default)]
    pub detail: NoteDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQuizRequest {
    pub topic: String,
    #[serde(default)]
    pub source_text: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

fn default_count() -> u32 {
    DEFAULT_GENERATED_COUNT
}

/// Generated questions come back with their answer key; the caller made them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuizResponse {
    pub questions: Vec<QuestionResponse>,
    pub new_achievements: Vec<AchievementId>,
}

impl From<&GeneratedQuiz> for GeneratedQuizResponse {
    fn from(generated: &GeneratedQuiz) -> Self {
        Self {
            questions: generated
                .questions
                .iter()
                .map(|q| QuestionResponse::from_question(q, true))
                .collect(),
            new_achievements: generated.new_achievements.clone(),
        }
    }
}
