//! Multiple-choice quiz questions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{QuestionId, Timestamp, UserId, ValidationError};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;
pub const MAX_QUESTION_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Score multiplier applied to correct answers.
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::invalid_format(
                "difficulty",
                format!("unknown difficulty '{}'", other),
            )),
        }
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: Timestamp,
}

/// Unvalidated question fields, as they arrive from a client or a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub topic: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn create(draft: QuestionDraft, created_by: Option<UserId>) -> Result<Self, ValidationError> {
        let topic = draft.topic.trim().to_string();
        if topic.is_empty() {
            return Err(ValidationError::empty_field("topic"));
        }

        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        if text.chars().count() > MAX_QUESTION_LEN {
            return Err(ValidationError::out_of_range(
                "text",
                1,
                MAX_QUESTION_LEN as i64,
                text.chars().count() as i64,
            ));
        }

        let options: Vec<String> = draft.options.iter().map(|o| o.trim().to_string()).collect();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(ValidationError::out_of_range(
                "options",
                MIN_OPTIONS as i64,
                MAX_OPTIONS as i64,
                options.len() as i64,
            ));
        }
        if options.iter().any(|o| o.is_empty()) {
            return Err(ValidationError::empty_field("options"));
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.eq_ignore_ascii_case(option)) {
                return Err(ValidationError::invalid_format(
                    "options",
                    format!("duplicate option '{}'", option),
                ));
            }
        }

        if draft.correct_option >= options.len() {
            return Err(ValidationError::out_of_range(
                "correct_option",
                0,
                options.len() as i64 - 1,
                draft.correct_option as i64,
            ));
        }

        let explanation = draft
            .explanation
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        Ok(Self {
            id: QuestionId::new(),
            topic,
            text,
            options,
            correct_option: draft.correct_option,
            difficulty: draft.difficulty,
            explanation,
            created_by,
            created_at: Timestamp::now(),
        })
    }

    pub fn is_correct(&self, selected_option: usize) -> bool {
        selected_option == self.correct_option
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            topic: "Astronomy".to_string(),
            text: "Which planet is known as the Red Planet?".to_string(),
            options: vec!["Venus".into(), "Mars".into(), "Jupiter".into(), "Saturn".into()],
            correct_option: 1,
            difficulty: Difficulty::Easy,
            explanation: Some("  Iron oxide on its surface.  ".to_string()),
        }
    }

    #[test]
    fn valid_draft_creates_question() {
        let q = Question::create(draft(), None).unwrap();
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.explanation.as_deref(), Some("Iron oxide on its surface."));
    }

    #[test]
    fn correct_option_must_be_in_range() {
        let mut d = draft();
        d.correct_option = 4;
        let err = Question::create(d, None).unwrap_err();
        assert_eq!(err.field(), "correct_option");
    }

    #[test]
    fn needs_at_least_two_options() {
        let mut d = draft();
        d.options = vec!["Mars".into()];
        d.correct_option = 0;
        assert!(Question::create(d, None).is_err());
    }

    #[test]
    fn duplicate_options_rejected() {
        let mut d = draft();
        d.options = vec!["Mars".into(), "mars".into()];
        d.correct_option = 0;
        assert!(matches!(
            Question::create(d, None),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn blank_text_rejected() {
        let mut d = draft();
        d.text = "   ".into();
        assert_eq!(
            Question::create(d, None).unwrap_err(),
            ValidationError::empty_field("text")
        );
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
