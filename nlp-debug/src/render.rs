//! Plain-text rendering of a [`CommandResult`]
//!
//! The CLI adds colour on top of these strings; nothing here depends on the
//! terminal.

use crate::model::CommandResult;
use serde_json::Value;

pub const RESULTS_TITLE: &str = "NLP Analysis Results";

/// Human label for the three language codes the service reports
pub fn language_label(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some("English"),
        "hi" => Some("Hindi"),
        "mixed" => Some("Hinglish"),
        _ => None,
    }
}

/// `en (English)`; unrecognized codes are shown bare
pub fn format_language(code: &str) -> String {
    match language_label(code) {
        Some(label) => format!("{} ({})", code, label),
        None => code.to_string(),
    }
}

/// Confidence in [0, 1] as a percentage with one decimal, e.g. `95.0%`.
///
/// Halves round up (`0.0625` is `6.3%`). Out-of-range scores are clamped;
/// NaN renders as `N/A`.
pub fn format_confidence(score: f64) -> String {
    if score.is_nan() {
        return "N/A".to_string();
    }
    let pct = (score.clamp(0.0, 1.0) * 1000.0).round() / 10.0;
    format!("{:.1}%", pct)
}

/// Objects, arrays and null as compact JSON, scalars as plain text
pub fn format_entity_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        structured => structured.to_string(),
    }
}

/// Display-ready fields of one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub language: String,
    pub intent: String,
    pub confidence: String,
    /// `Rule-based: <intent> (<pct>)`
    pub rule_based: String,
    /// `ML-based: <intent> (<pct>)`
    pub ml_based: String,
    /// `(name, value)` pairs; empty means "None"
    pub entities: Vec<(String, String)>,
}

impl ResultView {
    pub fn new(result: &CommandResult) -> Self {
        Self {
            language: format_language(&result.language),
            intent: result.intent.clone(),
            confidence: format_confidence(result.confidence),
            rule_based: format!(
                "Rule-based: {} ({})",
                result.rule_based_intent,
                format_confidence(result.rule_based_confidence)
            ),
            ml_based: format!(
                "ML-based: {} ({})",
                result.ml_intent,
                format_confidence(result.ml_confidence)
            ),
            entities: result
                .entities
                .iter()
                .map(|(key, value)| (key.clone(), format_entity_value(value)))
                .collect(),
        }
    }

    /// Entity rows as `name: value`, or the single row `None`
    pub fn entity_lines(&self) -> Vec<String> {
        if self.entities.is_empty() {
            return vec!["None".to_string()];
        }
        self.entities
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect()
    }

    /// Section headings followed by indented values
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Detected Language".to_string(),
            format!("  {}", self.language),
            "Predicted Intent".to_string(),
            format!("  {}  {} confidence", self.intent, self.confidence),
            format!("  {}", self.rule_based),
            format!("  {}", self.ml_based),
            "Extracted Entities".to_string(),
        ];
        lines.extend(self.entity_lines().into_iter().map(|l| format!("  {}", l)));
        lines
    }
}

pub fn render_result(result: &CommandResult) -> Vec<String> {
    ResultView::new(result).lines()
}
