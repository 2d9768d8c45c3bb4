//! ExtractDocumentHandler - uploaded study material to prompt-ready text.

use crate::domain::document::{extract_text, DocumentKind, ExtractedText};
use crate::domain::foundation::DomainError;

pub struct ExtractDocumentHandler {
    max_chars: usize,
}

impl ExtractDocumentHandler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn handle(&self, content_type: &str, bytes: &[u8]) -> Result<ExtractedText, DomainError> {
        let kind = DocumentKind::from_content_type(content_type)?;
        let extracted = extract_text(bytes, kind, self.max_chars)?;
        tracing::debug!(
            chars = extracted.char_count,
            truncated = extracted.truncated,
            "Document extracted"
        );
        Ok(extracted)
    }
}
