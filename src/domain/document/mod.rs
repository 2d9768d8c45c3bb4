//! Document module - turning uploaded study material into prompt-ready text.
//!
//! Plain text and Markdown are supported. Markdown syntax is stripped so the
//! model sees prose, whitespace is collapsed, and the result is cut at a word
//! boundary to fit the configured budget.

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Default character budget for extracted text.
pub const DEFAULT_MAX_CHARS: usize = 12_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Markdown,
}

impl DocumentKind {
    /// Maps a `Content-Type` value (parameters ignored) to a supported kind.
    pub fn from_content_type(content_type: &str) -> Result<Self, DomainError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" | "" => Ok(DocumentKind::PlainText),
            "text/markdown" | "text/x-markdown" => Ok(DocumentKind::Markdown),
            other => Err(DomainError::new(
                ErrorCode::UnsupportedDocument,
                format!("Unsupported document type: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub char_count: usize,
    pub truncated: bool,
}

pub fn extract_text(bytes: &[u8], kind: DocumentKind, max_chars: usize) -> Result<ExtractedText, DomainError> {
    let raw = std::str::from_utf8(bytes).map_err(|_| {
        DomainError::new(ErrorCode::UnsupportedDocument, "Document is not valid UTF-8 text")
    })?;

    let prose = match kind {
        DocumentKind::PlainText => raw.to_string(),
        DocumentKind::Markdown => strip_markdown(raw),
    };
    let normalized = collapse_whitespace(&prose);
    if normalized.is_empty() {
        return Err(DomainError::validation("document", "Document contains no text"));
    }

    let (text, truncated) = truncate_at_word(&normalized, max_chars);
    Ok(ExtractedText {
        char_count: text.chars().count(),
        text,
        truncated,
    })
}

fn strip_markdown(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_fence = false;

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            // keep code, it is often the point of the notes
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mut content = trimmed.trim_start_matches('#').trim_start_matches('>').trim_start();
        for bullet in ["- ", "* ", "+ "] {
            if let Some(rest) = content.strip_prefix(bullet) {
                content = rest;
            }
        }
        if let Some(pos) = content.find(". ") {
            if pos > 0 && content[..pos].chars().all(|c| c.is_ascii_digit()) {
                content = &content[pos + 2..];
            }
        }
        if content.chars().all(|c| matches!(c, '-' | '*' | '_' | '=' | ' ')) {
            out.push('\n');
            continue;
        }

        out.push_str(&strip_inline(content));
        out.push('\n');
    }

    out
}

/// Removes emphasis markers and reduces links and images to their text.
fn strip_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' | '_' | '`' => i += 1,
            '!' if chars.get(i + 1) == Some(&'[') => i += 1,
            '[' => {
                let close = chars[i..].iter().position(|c| *c == ']').map(|p| p + i);
                match close {
                    Some(close) if chars.get(close + 1) == Some(&'(') => {
                        out.extend(&chars[i + 1..close]);
                        let end = chars[close..]
                            .iter()
                            .position(|c| *c == ')')
                            .map(|p| p + close)
                            .unwrap_or(chars.len() - 1);
                        i = end + 1;
                    }
                    _ => {
                        out.push('[');
                        i += 1;
                    }
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_at_word(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut,
    };
    (trimmed, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_mapping() {
        assert_eq!(
            DocumentKind::from_content_type("text/markdown; charset=utf-8").unwrap(),
            DocumentKind::Markdown
        );
        assert_eq!(
            DocumentKind::from_content_type("text/plain").unwrap(),
            DocumentKind::PlainText
        );
        let err = DocumentKind::from_content_type("application/pdf").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedDocument);
    }

    #[test]
    fn markdown_syntax_is_stripped() {
        let md = "# Cells\n\n- **Nucleus** holds DNA\n1. See [the guide](http://x.y)\n---\n> quoted";
        let out = extract_text(md.as_bytes(), DocumentKind::Markdown, 1_000).unwrap();
        assert_eq!(out.text, "Cells Nucleus holds DNA See the guide quoted");
        assert!(!out.truncated);
    }

    #[test]
    fn code_fences_keep_their_body() {
        let md = "Intro\n```rust\nlet x = 1;\n```\nOutro";
        let out = extract_text(md.as_bytes(), DocumentKind::Markdown, 1_000).unwrap();
        assert_eq!(out.text, "Intro let x = 1; Outro");
    }

    #[test]
    fn long_text_is_cut_on_a_word_boundary() {
        let out = extract_text(b"alpha beta gamma delta", DocumentKind::PlainText, 13).unwrap();
        assert_eq!(out.text, "alpha beta");
        assert!(out.truncated);
        assert_eq!(out.char_count, 10);
    }

    #[test]
    fn empty_and_binary_documents_are_rejected() {
        assert!(extract_text(b"   \n ", DocumentKind::PlainText, 100).is_err());
        assert!(extract_text(&[0xff, 0xfe, 0x00], DocumentKind::PlainText, 100).is_err());
    }
}
