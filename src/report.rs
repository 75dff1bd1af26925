//! Presenter: render an [`AnalysisResult`] for a human and export it as JSON.
//!
//! Rendering never transforms values. Lists keep the order the model gave,
//! numbers print as received, and narratives print verbatim.

use crate::error::ResumeError;
use crate::output::{
    AnalysisFailure, AnalysisResult, ItemList, Narrative, ResumeAnalysis, Score,
    FIELD_AREAS_FOR_IMPROVEMENT,
    FIELD_EDUCATION_ANALYSIS, FIELD_EXPERIENCE_ANALYSIS, FIELD_FORMAT_AND_PRESENTATION,
    FIELD_KEY_STRENGTHS, FIELD_OVERALL_SCORE, FIELD_SKILLS_ASSESSMENT,
    FIELD_SPECIFIC_RECOMMENDATIONS,
};
use ansi::{bold, cyan, dim, green, red};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

mod ansi {
    pub fn green(s: &str) -> String {
        format!("\x1b[32m{s}\x1b[0m")
    }
    pub fn red(s: &str) -> String {
        format!("\x1b[31m{s}\x1b[0m")
    }
    pub fn dim(s: &str) -> String {
        format!("\x1b[2m{s}\x1b[0m")
    }
    pub fn bold(s: &str) -> String {
        format!("\x1b[1m{s}\x1b[0m")
    }
    pub fn cyan(s: &str) -> String {
        format!("\x1b[36m{s}\x1b[0m")
    }
}

/// Output flavour of [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// Plain text, no escape codes. (default)
    #[default]
    Plain,
    /// Terminal text with ANSI colours.
    Ansi,
    /// GitHub-flavoured Markdown; the raw reply goes in a collapsed
    /// `<details>` block.
    Markdown,
}

/// Rendering options.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub style: ReportStyle,
    /// Print the raw model reply of a failed analysis. Default: false.
    pub show_raw: bool,
    /// Width of the score bar in cells. Default: 40.
    pub bar_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            style: ReportStyle::Plain,
            show_raw: false,
            bar_width: 40,
        }
    }
}

/// Render either shape as a report.
pub fn render_report(result: &AnalysisResult, options: &ReportOptions) -> String {
    let mut w = ReportWriter::new(options);
    match result {
        AnalysisResult::Success(a) => w.analysis(a),
        AnalysisResult::Failure(f) => w.failure(f),
    }
    w.finish()
}

/// A proportional bar for a 0–100 score. Out-of-range scores are clamped
/// for drawing only.
pub fn score_bar(score: f64, width: usize) -> String {
    let ratio = if score.is_finite() {
        (score / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Serialise a successful analysis as indented JSON in schema key order.
pub fn export_json(analysis: &ResumeAnalysis) -> Result<String, ResumeError> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

/// Write the JSON export to `path` atomically (temp file + rename).
pub fn write_export(analysis: &ResumeAnalysis, path: &Path) -> Result<PathBuf, ResumeError> {
    let json = export_json(analysis)?;
    let write_err = |source: std::io::Error| ResumeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            std::fs::create_dir_all(p).map_err(write_err)?;
            p.to_path_buf()
        }
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Analysis exported to {}", path.display());
    Ok(path.to_path_buf())
}

/// One-line rendering of a nested JSON value.
fn inline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A backtick fence longer than any backtick run inside `text`.
fn code_fence(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

// ── Writer ───────────────────────────────────────────────────────────────

struct ReportWriter<'a> {
    options: &'a ReportOptions,
    out: String,
}

impl<'a> ReportWriter<'a> {
    fn new(options: &'a ReportOptions) -> Self {
        Self {
            options,
            out: String::new(),
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn heading(&mut self, title: &str) {
        let h = match self.options.style {
            ReportStyle::Plain => title.to_string(),
            ReportStyle::Ansi => bold(&cyan(title)),
            ReportStyle::Markdown => format!("## {title}"),
        };
        self.line(&h);
        if self.options.style == ReportStyle::Markdown {
            self.blank();
        }
    }

    fn bullet(&mut self, item: &str) {
        let b = match self.options.style {
            ReportStyle::Markdown => format!("- {item}"),
            _ => format!("  - {item}"),
        };
        self.line(&b);
    }

    fn paragraph(&mut self, text: &str) {
        for l in text.lines() {
            let p = match self.options.style {
                ReportStyle::Markdown => l.to_string(),
                _ => format!("  {l}"),
            };
            self.line(p.trim_end());
        }
    }

    fn list_section(&mut self, title: &str, list: &ItemList) {
        self.heading(title);
        if list.is_empty() {
            self.paragraph("(none)");
        } else {
            match list {
                ItemList::Items(items) => {
                    for item in items {
                        self.bullet(item);
                    }
                }
                ItemList::Other(value) => self.value(value),
            }
        }
        self.blank();
    }

    /// Any JSON value the model sent where text or a list was expected.
    fn value(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.paragraph(s),
            Value::Array(items) => {
                for item in items {
                    self.bullet(&inline(item));
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    self.bullet(&format!("{k}: {}", inline(v)));
                }
            }
            other => self.paragraph(&other.to_string()),
        }
    }

    fn narrative_section(&mut self, title: &str, narrative: &Narrative) {
        self.heading(title);
        match narrative {
            Narrative::Text(t) => self.paragraph(t),
            Narrative::Items(items) => {
                for item in items {
                    self.bullet(item);
                }
            }
            Narrative::Structured(value) => self.value(value),
        }
        self.blank();
    }

    fn analysis(&mut self, a: &ResumeAnalysis) {
        self.heading(FIELD_OVERALL_SCORE);
        let bar = score_bar(
            a.overall_score.as_f64().unwrap_or(f64::NAN),
            self.options.bar_width,
        );
        let score = match a.overall_score {
            Score::Number(ref n) => format!("{n}/100"),
            ref other => other.to_string(),
        };
        let line = match self.options.style {
            ReportStyle::Plain => format!("  [{bar}] {score}"),
            ReportStyle::Ansi => format!("  [{}] {}", green(&bar), bold(&score)),
            ReportStyle::Markdown => format!("`{bar}` **{score}**"),
        };
        self.line(&line);
        self.blank();

        self.list_section(FIELD_KEY_STRENGTHS, &a.key_strengths);
        self.list_section(FIELD_AREAS_FOR_IMPROVEMENT, &a.areas_for_improvement);
        self.narrative_section(FIELD_SKILLS_ASSESSMENT, &a.skills_assessment);
        self.narrative_section(FIELD_EXPERIENCE_ANALYSIS, &a.experience_analysis);
        self.narrative_section(FIELD_EDUCATION_ANALYSIS, &a.education_analysis);
        self.narrative_section(FIELD_FORMAT_AND_PRESENTATION, &a.format_and_presentation);
        self.list_section(FIELD_SPECIFIC_RECOMMENDATIONS, &a.specific_recommendations);
    }

    fn failure(&mut self, f: &AnalysisFailure) {
        let headline = format!("An error occurred: {}", f.message);
        match self.options.style {
            ReportStyle::Plain => self.line(&format!("Error: {headline}")),
            ReportStyle::Ansi => self.line(&format!("{} {}", red("✘"), red(&bold(&headline)))),
            ReportStyle::Markdown => self.line(&format!("> **Error:** {headline}")),
        }

        let Some(raw) = f.raw_response.as_deref() else {
            return;
        };
        self.blank();

        match self.options.style {
            ReportStyle::Markdown => {
                // <details> is collapsed until the reader opens it.
                let open = if self.options.show_raw { " open" } else { "" };
                let fence = code_fence(raw);
                self.line(&format!("<details{open}><summary>Show raw AI response</summary>"));
                self.blank();
                self.line(&fence);
                self.line(raw);
                self.line(&fence);
                self.blank();
                self.line("</details>");
            }
            _ if self.options.show_raw => {
                self.heading("Raw AI response");
                self.line(raw);
            }
            ReportStyle::Ansi => {
                self.line(&dim(&format!("Raw AI response hidden ({} bytes)", raw.len())));
            }
            ReportStyle::Plain => {
                self.line(&format!("Raw AI response hidden ({} bytes)", raw.len()));
            }
        }
    }
}
