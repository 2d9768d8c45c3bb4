//! Prompt templates for study notes and quiz generation.

use crate::domain::quiz::Difficulty;

use super::NoteDetail;

pub const NOTES_SYSTEM_PROMPT: &str = "You are a patient tutor who writes clear, accurate study notes \
for students. Respond with a single JSON object and nothing else.";

pub const QUIZ_SYSTEM_PROMPT: &str = "You write fair multiple-choice quiz questions with exactly one \
correct answer. Respond with a single JSON object and nothing else.";

fn source_block(source_text: Option<&str>) -> String {
    match source_text.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => format!(
            "\n\nBase the material only on the following source text:\n<source>\n{}\n</source>",
            text
        ),
        None => String::new(),
    }
}

pub fn notes_prompt(topic: &str, detail: NoteDetail, source_text: Option<&str>) -> String {
    let depth = match detail {
        NoteDetail::Brief => "3 to 5 key points and 2 short sections",
        NoteDetail::Standard => "5 to 8 key points and 3 to 5 sections",
        NoteDetail::Detailed => "8 to 12 key points and 5 to 8 thorough sections with examples",
    };

    format!(
        "Write study notes on the topic \"{topic}\" with {depth}.{source}\n\n\
         Use this JSON shape:\n\
         {{\"title\": string, \"summary\": string, \"key_points\": [string], \
         \"sections\": [{{\"heading\": string, \"content\": string}}]}}",
        topic = topic.trim(),
        depth = depth,
        source = source_block(source_text),
    )
}

pub fn quiz_prompt(
    topic: &str,
    count: u32,
    difficulty: Difficulty,
    source_text: Option<&str>,
    avoid: &[String],
) -> String {
    let avoid_block = if avoid.is_empty() {
        String::new()
    } else {
        let listed: Vec<String> = avoid.iter().take(20).map(|q| format!("- {}", q)).collect();
        format!(
            "\n\nDo not repeat or rephrase any of these earlier questions:\n{}",
            listed.join("\n")
        )
    };

    format!(
        "Write {count} {difficulty} multiple-choice questions about \"{topic}\". \
         Each question has 4 options and exactly one correct answer; vary which option is correct.\
         {source}{avoid}\n\n\
         Use this JSON shape:\n\
         {{\"questions\": [{{\"question\": string, \"options\": [string], \
         \"correct_index\": number, \"explanation\": string}}]}}",
        count = count,
        difficulty = difficulty,
        topic = topic.trim(),
        source = source_block(source_text),
        avoid = avoid_block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_prompt_mentions_topic_and_shape() {
        let prompt = notes_prompt(" Photosynthesis ", NoteDetail::Brief, None);
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("key_points"));
        assert!(!prompt.contains("<source>"));
    }

    #[test]
    fn source_text_is_embedded() {
        let prompt = notes_prompt("Cells", NoteDetail::Standard, Some("Cells divide."));
        assert!(prompt.contains("<source>\nCells divide.\n</source>"));
    }

    #[test]
    fn quiz_prompt_lists_questions_to_avoid() {
        let avoid = vec!["What is ATP?".to_string()];
        let prompt = quiz_prompt("Biology", 5, Difficulty::Hard, None, &avoid);
        assert!(prompt.contains("Write 5 hard multiple-choice"));
        assert!(prompt.contains("- What is ATP?"));
    }
}
