//! Study module - AI-generated notes and quiz questions.
//!
//! Prompt construction and completion parsing live here; calling the model
//! is the application layer's job, through the `AIProvider` port.

pub mod parsing;
pub mod prompts;

use serde::{Deserialize, Serialize};

/// Maximum questions generated per request.
pub const MAX_GENERATED_QUESTIONS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteDetail {
    Brief,
    #[default]
    Standard,
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSection {
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyNotes {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub sections: Vec<NoteSection>,
}
