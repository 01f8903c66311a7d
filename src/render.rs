//! Output formatting for generated questions.
//!
//! Supports plain-text output for the terminal and JSON for scripting.

use crate::annotator::Entity;
use crate::mcq::McqItem;
use serde::Serialize;
use std::fmt::Write;

/// Shown instead of questions when no sentence was usable.
pub const NO_QUESTIONS_NOTICE: &str = "No suitable sentences found to create MCQs.";

const ENTITIES_HEADER: &str = "Named Entities in Transcript";

/// JSON output structure
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub video_id: &'a str,
    pub questions: &'a [McqItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<&'a [Entity]>,
}

/// Formats questions for human-readable terminal output.
///
/// An empty list renders as [`NO_QUESTIONS_NOTICE`].
pub fn format_human(items: &[McqItem]) -> String {
    if items.is_empty() {
        return NO_QUESTIONS_NOTICE.to_string();
    }

    let mut output = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(output, "Q{}: {}?", i + 1, item.stem());
        for (label, choice) in item.labeled_choices() {
            let _ = writeln!(output, "{}: {}", label, choice);
        }
        let _ = writeln!(output, "Correct Answer: {}", item.correct_label());
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Formats named entities, one per line with their mention count.
pub fn format_entities(entities: &[Entity]) -> String {
    let mut output = String::from(ENTITIES_HEADER);
    if entities.is_empty() {
        output.push_str("\n(none)");
    }
    for entity in entities {
        let _ = write!(output, "\n{} ({})", entity.text, entity.mentions);
    }
    output
}

/// Formats questions (and optionally entities) as JSON.
pub fn format_json(video_id: &str, items: &[McqItem], entities: Option<&[Entity]>) -> String {
    let output = JsonOutput {
        video_id,
        questions: items,
        entities,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
