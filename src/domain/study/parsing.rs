//! Pulling structured JSON out of model completions.
//!
//! Models wrap JSON in code fences or chatter around it. We take the first
//! fenced block if there is one, otherwise the outermost `{...}` or `[...]`
//! span, and hand that to serde.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::quiz::{Difficulty, QuestionDraft};

use super::StudyNotes;

fn parse_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::AIProviderError, message)
}

/// Returns the JSON-looking slice of a completion.
pub fn extract_json(raw: &str) -> Option<&str> {
    if let Some(start) = raw.find("```") {
        let after_fence = &raw[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    let open = raw.find(|c| c == '{' || c == '[')?;
    let close_char = if raw[open..].starts_with('{') { '}' } else { ']' };
    let close = raw.rfind(close_char)?;
    if close <= open {
        return None;
    }
    Some(&raw[open..=close])
}

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, DomainError> {
    let json = extract_json(raw).ok_or_else(|| parse_error("Model response contained no JSON"))?;
    serde_json::from_str(json)
        .map_err(|e| parse_error(format!("Model response was not in the expected shape: {}", e)))
}

pub fn parse_notes(raw: &str) -> Result<StudyNotes, DomainError> {
    let notes: StudyNotes = parse_json(raw)?;
    if notes.title.trim().is_empty() || notes.sections.is_empty() {
        return Err(parse_error("Model returned empty notes"));
    }
    Ok(notes)
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    #[serde(alias = "text")]
    question: String,
    options: Vec<String>,
    #[serde(alias = "correct_option", alias = "answer_index")]
    correct_index: usize,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedQuiz {
    Wrapped { questions: Vec<GeneratedQuestion> },
    Bare(Vec<GeneratedQuestion>),
}

/// Parses generated questions into drafts. Validation happens when the
/// drafts become `Question`s; malformed entries are the caller's to drop.
pub fn parse_quiz(raw: &str, topic: &str, difficulty: Difficulty) -> Result<Vec<QuestionDraft>, DomainError> {
    let quiz: GeneratedQuiz = parse_json(raw)?;
    let questions = match quiz {
        GeneratedQuiz::Wrapped { questions } => questions,
        GeneratedQuiz::Bare(questions) => questions,
    };
    if questions.is_empty() {
        return Err(parse_error("Model returned no questions"));
    }

    Ok(questions
        .into_iter()
        .map(|q| QuestionDraft {
            topic: topic.to_string(),
            text: q.question,
            options: q.options,
            correct_option: q.correct_index,
            difficulty,
            explanation: q.explanation,
        })
        .collect())
}
