//! Study handlers - AI-generated notes and questions, and document extraction.

mod extract_document;
mod generate_notes;
mod generate_quiz;
mod quota;

pub use extract_document::ExtractDocumentHandler;
pub use generate_notes::{GenerateNotesCommand, GenerateNotesHandler, GeneratedNotes};
pub use generate_quiz::{GenerateQuizCommand, GenerateQuizHandler, GeneratedQuiz};
pub use quota::GenerationQuota;

use crate::domain::document::{extract_text, DocumentKind};
use crate::domain::foundation::DomainError;

/// Longest topic accepted for generation.
pub const MAX_TOPIC_LENGTH: usize = 200;

fn validate_topic(topic: &str) -> Result<String, DomainError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(DomainError::validation("topic", "Topic cannot be empty"));
    }
    if topic.chars().count() > MAX_TOPIC_LENGTH {
        return Err(DomainError::validation(
            "topic",
            format!("Topic cannot exceed {} characters", MAX_TOPIC_LENGTH),
        ));
    }
    Ok(topic.to_string())
}

/// Normalizes pasted source material to the prompt budget. Blank input is dropped.
fn prepare_source(source_text: Option<&str>, max_chars: usize) -> Result<Option<String>, DomainError> {
    match source_text.filter(|s| !s.trim().is_empty()) {
        Some(text) => Ok(Some(extract_text(text.as_bytes(), DocumentKind::PlainText, max_chars)?.text)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn topics_are_trimmed_and_bounded() {
        assert_eq!(validate_topic("  Cell biology ").unwrap(), "Cell biology");
        assert_eq!(validate_topic("   ").unwrap_err().code, ErrorCode::ValidationFailed);
        assert!(validate_topic(&"x".repeat(MAX_TOPIC_LENGTH + 1)).is_err());
    }

    #[test]
    fn source_text_is_cut_to_budget() {
        let long = "word ".repeat(100);
        let source = prepare_source(Some(&long), 42).unwrap().unwrap();
        assert!(source.chars().count() <= 42);
        assert_eq!(prepare_source(Some("  \n "), 42).unwrap(), None);
        assert_eq!(prepare_source(None, 42).unwrap(), None);
    }
}
