//! Analysis result types: the success shape, the error shape, and run stats.
//!
//! [`ResumeAnalysis`] field order is the export order, so the downloadable
//! JSON always lists keys exactly as the prompt schema does.

use crate::document::MediaType;
use crate::error::{ServiceError, ServiceErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Default file name of the exported analysis.
pub const EXPORT_FILE_NAME: &str = "resume_analysis.json";

pub const FIELD_OVERALL_SCORE: &str = "Overall Score";
pub const FIELD_KEY_STRENGTHS: &str = "Key Strengths";
pub const FIELD_AREAS_FOR_IMPROVEMENT: &str = "Areas for Improvement";
pub const FIELD_SKILLS_ASSESSMENT: &str = "Skills Assessment";
pub const FIELD_EXPERIENCE_ANALYSIS: &str = "Experience Analysis";
pub const FIELD_EDUCATION_ANALYSIS: &str = "Education Analysis";
pub const FIELD_FORMAT_AND_PRESENTATION: &str = "Format and Presentation";
pub const FIELD_SPECIFIC_RECOMMENDATIONS: &str = "Specific Recommendations";

/// The eight keys every successful reply must carry, in schema order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    FIELD_OVERALL_SCORE,
    FIELD_KEY_STRENGTHS,
    FIELD_AREAS_FOR_IMPROVEMENT,
    FIELD_SKILLS_ASSESSMENT,
    FIELD_EXPERIENCE_ANALYSIS,
    FIELD_EDUCATION_ANALYSIS,
    FIELD_FORMAT_AND_PRESENTATION,
    FIELD_SPECIFIC_RECOMMENDATIONS,
];

/// User-facing message for a reply that is not JSON.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response as JSON. Please try again.";

/// The overall score.
///
/// The prompt asks for a number from 0 to 100, and that is what arrives in
/// practice. Anything else (`"82"`, `"8/10"`, `null`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(Number),
    Other(Value),
}

impl Score {
    /// Numeric value, if the model sent a JSON number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Score::Number(n) => n.as_f64(),
            Score::Other(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Score::Number(n) => n.as_u64(),
            Score::Other(_) => None,
        }
    }

    /// A number within the documented 0–100 range.
    pub fn in_range(&self) -> bool {
        self.as_f64()
            .is_some_and(|s| (0.0..=100.0).contains(&s))
    }
}

impl From<Value> for Score {
    fn from(v: Value) -> Self {
        match v {
            Value::Number(n) => Score::Number(n),
            other => Score::Other(other),
        }
    }
}

impl From<u64> for Score {
    fn from(n: u64) -> Self {
        Score::Number(n.into())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Number(n) => write!(f, "{n}"),
            Score::Other(Value::String(s)) => f.write_str(s),
            Score::Other(v) => write!(f, "{v}"),
        }
    }
}

/// A bulleted section (strengths, improvement areas, recommendations).
///
/// Normally a list of strings; any other JSON value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Items(Vec<String>),
    Other(Value),
}

impl ItemList {
    /// The items, if the model sent a list of strings.
    pub fn items(&self) -> Option<&[String]> {
        match self {
            ItemList::Items(items) => Some(items),
            ItemList::Other(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ItemList::Items(items) => items.is_empty(),
            ItemList::Other(Value::Null) => true,
            ItemList::Other(Value::Array(a)) => a.is_empty(),
            ItemList::Other(Value::String(s)) => s.trim().is_empty(),
            ItemList::Other(_) => false,
        }
    }
}

impl From<Value> for ItemList {
    fn from(v: Value) -> Self {
        match string_items(v) {
            Ok(items) => ItemList::Items(items),
            Err(other) => ItemList::Other(other),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for ItemList {
    fn from(items: Vec<S>) -> Self {
        ItemList::Items(items.into_iter().map(Into::into).collect())
    }
}

impl<S: AsRef<str>> PartialEq<Vec<S>> for ItemList {
    fn eq(&self, other: &Vec<S>) -> bool {
        self.items().is_some_and(|items| {
            items.len() == other.len()
                && items.iter().zip(other).all(|(a, b)| a == b.as_ref())
        })
    }
}

/// A free-text analysis section.
///
/// The prompt asks for a string, but models regularly answer with a list or
/// an object. Whatever arrives is kept verbatim so the export matches the
/// reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Narrative {
    Text(String),
    Items(Vec<String>),
    Structured(Value),
}

impl From<&str> for Narrative {
    fn from(s: &str) -> Self {
        Narrative::Text(s.to_string())
    }
}

impl From<Value> for Narrative {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Narrative::Text(s),
            other => match string_items(other) {
                Ok(items) => Narrative::Items(items),
                Err(other) => Narrative::Structured(other),
            },
        }
    }
}

/// An array whose elements are all strings, or the value back unchanged.
fn string_items(v: Value) -> Result<Vec<String>, Value> {
    match v {
        Value::Array(arr) if arr.iter().all(Value::is_string) => Ok(arr
            .into_iter()
            .filter_map(|e| match e {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        other => Err(other),
    }
}

/// Success shape: a fully populated analysis.
///
/// Every field holds the reply's value as received; only presence is
/// guaranteed, not type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Overall score, nominally 0–100.
    #[serde(rename = "Overall Score")]
    pub overall_score: Score,

    #[serde(rename = "Key Strengths")]
    pub key_strengths: ItemList,

    #[serde(rename = "Areas for Improvement")]
    pub areas_for_improvement: ItemList,

    #[serde(rename = "Skills Assessment")]
    pub skills_assessment: Narrative,

    #[serde(rename = "Experience Analysis")]
    pub experience_analysis: Narrative,

    #[serde(rename = "Education Analysis")]
    pub education_analysis: Narrative,

    #[serde(rename = "Format and Presentation")]
    pub format_and_presentation: Narrative,

    #[serde(rename = "Specific Recommendations")]
    pub specific_recommendations: ItemList,
}

/// Why an analysis ended in the error shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// The completion call itself failed.
    Service { category: ServiceErrorKind },
    /// The reply was not JSON.
    Parse,
    /// The reply was JSON but lacked a required key.
    MissingField { field: String },
}

/// Error shape: a message for the user and, when a reply arrived, the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub kind: FailureKind,
    #[serde(rename = "error")]
    pub message: String,
    /// Model reply exactly as received. `None` when no reply was received.
    pub raw_response: Option<String>,
}

impl AnalysisFailure {
    pub fn service(err: &ServiceError) -> Self {
        Self {
            kind: FailureKind::Service { category: err.kind },
            message: format!("API Error ({}): {}", err.kind, err.detail),
            raw_response: None,
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self {
            kind: FailureKind::Parse,
            message: PARSE_FAILURE_MESSAGE.to_string(),
            raw_response: Some(raw.to_string()),
        }
    }

    pub fn missing_field(field: &str, raw: &str) -> Self {
        Self {
            kind: FailureKind::MissingField {
                field: field.to_string(),
            },
            message: format!("Missing required field: {field}"),
            raw_response: Some(raw.to_string()),
        }
    }

    /// The field named by a missing-field failure, if any.
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            FailureKind::MissingField { field } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one analysis: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(ResumeAnalysis),
    Failure(AnalysisFailure),
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }

    pub fn analysis(&self) -> Option<&ResumeAnalysis> {
        match self {
            AnalysisResult::Success(a) => Some(a),
            AnalysisResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match self {
            AnalysisResult::Success(_) => None,
            AnalysisResult::Failure(f) => Some(f),
        }
    }

    pub fn into_result(self) -> Result<ResumeAnalysis, AnalysisFailure> {
        match self {
            AnalysisResult::Success(a) => Ok(a),
            AnalysisResult::Failure(f) => Err(f),
        }
    }
}

/// Timing and size figures for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub document_name: String,
    pub media_type: Option<MediaType>,
    pub document_bytes: usize,
    pub extracted_chars: usize,
    pub backend: String,
    pub model: String,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub result: AnalysisResult,
    pub stats: AnalysisStats,
}
