//! Reply validation: untrusted model text → [`AnalysisResult`].
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. trim, then parse as JSON (else [`FailureKind::Parse`])
//! 2. every required key present, in schema order (else `MissingField`
//!    naming the first absent key; a non-object reply lacks all of them)
//!
//! Presence is the whole contract. Values are never rewritten or
//! type-checked: a string score or a list of objects is carried into the
//! success shape exactly as received and only logged. Keys outside the
//! schema are ignored.
//!
//! [`FailureKind::Parse`]: crate::output::FailureKind::Parse

use crate::output::{
    AnalysisFailure, AnalysisResult, ItemList, ResumeAnalysis, Score,
    FIELD_AREAS_FOR_IMPROVEMENT, FIELD_EDUCATION_ANALYSIS, FIELD_EXPERIENCE_ANALYSIS,
    FIELD_FORMAT_AND_PRESENTATION, FIELD_KEY_STRENGTHS, FIELD_OVERALL_SCORE,
    FIELD_SKILLS_ASSESSMENT, FIELD_SPECIFIC_RECOMMENDATIONS, REQUIRED_FIELDS,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Validate a raw model reply.
pub fn parse_reply(raw: &str) -> AnalysisResult {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            debug!("Reply is not JSON: {}", e);
            return AnalysisResult::Failure(AnalysisFailure::parse(raw));
        }
    };

    let obj = match value {
        Value::Object(map) => map,
        other => {
            debug!("Reply is JSON but not an object: {}", json_type(&other));
            Map::new()
        }
    };

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
        debug!("Reply lacks required field '{}'", missing);
        return AnalysisResult::Failure(AnalysisFailure::missing_field(missing, raw));
    }

    let extra = obj.len() - REQUIRED_FIELDS.len();
    if extra > 0 {
        debug!("Ignoring {} key(s) outside the schema", extra);
    }

    let analysis = decode(obj);
    log_unexpected_shapes(&analysis);
    AnalysisResult::Success(analysis)
}

/// Move the required values out of the reply. Presence is already checked.
fn decode(mut obj: Map<String, Value>) -> ResumeAnalysis {
    let mut take = |name: &str| obj.remove(name).unwrap_or(Value::Null);
    ResumeAnalysis {
        overall_score: take(FIELD_OVERALL_SCORE).into(),
        key_strengths: take(FIELD_KEY_STRENGTHS).into(),
        areas_for_improvement: take(FIELD_AREAS_FOR_IMPROVEMENT).into(),
        skills_assessment: take(FIELD_SKILLS_ASSESSMENT).into(),
        experience_analysis: take(FIELD_EXPERIENCE_ANALYSIS).into(),
        education_analysis: take(FIELD_EDUCATION_ANALYSIS).into(),
        format_and_presentation: take(FIELD_FORMAT_AND_PRESENTATION).into(),
        specific_recommendations: take(FIELD_SPECIFIC_RECOMMENDATIONS).into(),
    }
}

fn log_unexpected_shapes(analysis: &ResumeAnalysis) {
    match analysis.overall_score {
        Score::Number(_) if !analysis.overall_score.in_range() => warn!(
            "Overall Score {} is outside 0–100; keeping it as received",
            analysis.overall_score
        ),
        Score::Other(ref v) => warn!(
            "Overall Score is a {}, not a number; keeping it as received",
            json_type(v)
        ),
        _ => {}
    }

    for (name, list) in [
        (FIELD_KEY_STRENGTHS, &analysis.key_strengths),
        (FIELD_AREAS_FOR_IMPROVEMENT, &analysis.areas_for_improvement),
        (FIELD_SPECIFIC_RECOMMENDATIONS, &analysis.specific_recommendations),
    ] {
        if let ItemList::Other(v) = list {
            warn!(
                "'{}' is a {}, not a list of strings; keeping it as received",
                name,
                json_type(v)
            );
        }
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
