//! Prompts sent to the model.
//!
//! The system prompt is the only thing standing between the model and free
//! text, so it spells out the exact schema the validator expects. Keeping it
//! here lets tests assert that every required key is actually requested.
//!
//! Callers can override the default via
//! [`crate::config::AnalyzerConfig::system_prompt`].

/// Default system prompt: describes the eight-key schema and forbids any
/// text around the JSON object.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert resume reviewer. Analyse the resume supplied by the user and answer with feedback in exactly this JSON format:
{
    "Overall Score": <number between 0-100>,
    "Key Strengths": [<list of strengths>],
    "Areas for Improvement": [<list of areas>],
    "Skills Assessment": "<detailed analysis>",
    "Experience Analysis": "<detailed analysis>",
    "Education Analysis": "<detailed analysis>",
    "Format and Presentation": "<detailed analysis>",
    "Specific Recommendations": [<list of recommendations>]
}

The response must be valid JSON. Do not include any text before or after the JSON object and do not wrap it in code fences."#;

/// Build the user message carrying the extracted resume text.
pub fn user_message(resume_text: &str) -> String {
    format!("Here is the resume to analyze:\n\n{resume_text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::REQUIRED_FIELDS;

    #[test]
    fn prompt_requests_every_required_field() {
        for field in REQUIRED_FIELDS {
            assert!(
                DEFAULT_SYSTEM_PROMPT.contains(&format!("\"{field}\"")),
                "prompt does not mention {field}"
            );
        }
    }

    #[test]
    fn user_message_embeds_text_verbatim() {
        let msg = user_message("Jane Doe\nSoftware Engineer");
        assert!(msg.ends_with("\n\nJane Doe\nSoftware Engineer"));
    }
}
