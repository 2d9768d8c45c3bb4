//! GenerateNotesHandler - study notes for a topic, optionally grounded in pasted material.

use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::progress::ProgressRecorder;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::progression::{AchievementContext, AchievementId};
use crate::domain::study::parsing::parse_notes;
use crate::domain::study::prompts::{notes_prompt, NOTES_SYSTEM_PROMPT};
use crate::domain::study::{NoteDetail, StudyNotes};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

use super::{prepare_source, validate_topic, GenerationQuota};

#[derive(Debug, Clone)]
pub struct GenerateNotesCommand {
    pub user_id: UserId,
    pub display_name: String,
    pub topic: String,
    pub source_text: Option<String>,
    pub detail: NoteDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedNotes {
    pub notes: StudyNotes,
    pub new_achievements: Vec<AchievementId>,
}

pub struct GenerateNotesHandler {
    ai: Arc<dyn AIProvider>,
    quota: Arc<GenerationQuota>,
    progress: Arc<ProgressRecorder>,
    max_source_chars: usize,
}

impl GenerateNotesHandler {
    pub fn new(
        ai: Arc<dyn AIProvider>,
        quota: Arc<GenerationQuota>,
        progress: Arc<ProgressRecorder>,
        max_source_chars: usize,
    ) -> Self {
        Self {
            ai,
            quota,
            progress,
            max_source_chars,
        }
    }

    pub async fn handle(&self, cmd: GenerateNotesCommand) -> Result<GeneratedNotes, DomainError> {
        let topic = validate_topic(&cmd.topic)?;
        let source = prepare_source(cmd.source_text.as_deref(), self.max_source_chars)?;
        self.quota.consume(&cmd.user_id).await?;

        let request = CompletionRequest::new(RequestMetadata::new(cmd.user_id.clone(), "study_notes"))
            .with_system_prompt(NOTES_SYSTEM_PROMPT)
            .with_message(MessageRole::User, notes_prompt(&topic, cmd.detail, source.as_deref()))
            .with_temperature(0.4)
            .expecting_json();
        let response = self.ai.complete(request).await?;
        let notes = parse_notes(&response.content)?;

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
            sections = notes.sections.len(),
            tokens = response.usage.total_tokens,
            "Study notes generated"
        );
        Ok(GeneratedNotes {
            notes,
            new_achievements: update.unlocked_ids(),
        })
    }
}
