//! Request, result and status types shared by the console components

use crate::form::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const UNKNOWN: &str = "unknown";
pub const NO_RESPONSE: &str = "No response generated";

/// Language hint sent alongside a command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguagePreference {
    /// Let the service detect the language; never sent on the wire
    #[default]
    Auto,
    English,
    Hindi,
    /// Hinglish
    Mixed,
}

impl LanguagePreference {
    pub const ALL: [LanguagePreference; 4] = [
        LanguagePreference::Auto,
        LanguagePreference::English,
        LanguagePreference::Hindi,
        LanguagePreference::Mixed,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LanguagePreference::Auto => "auto",
            LanguagePreference::English => "en",
            LanguagePreference::Hindi => "hi",
            LanguagePreference::Mixed => "mixed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LanguagePreference::Auto => "Auto Detect",
            LanguagePreference::English => "English",
            LanguagePreference::Hindi => "Hindi",
            LanguagePreference::Mixed => "Mixed (Hinglish)",
        }
    }

    /// Value for the `language_preference` field: `None` for auto
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            LanguagePreference::Auto => None,
            other => Some(other.code()),
        }
    }
}

impl FromStr for LanguagePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguagePreference::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidLanguage(s.to_string()))
    }
}

impl fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Body of `POST /api/process`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub message: String,
    pub language_preference: Option<String>,
}

impl CommandRequest {
    pub fn new(message: impl Into<String>, language: LanguagePreference) -> Self {
        Self {
            message: message.into(),
            language_preference: language.wire_value().map(str::to_string),
        }
    }
}

/// Normalized analysis of one command; every field is always populated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub language: String,
    pub intent: String,
    pub confidence: f64,
    pub rule_based_intent: String,
    pub rule_based_confidence: f64,
    pub ml_intent: String,
    pub ml_confidence: f64,
    pub entities: Map<String, Value>,
    pub response_text: String,
}

impl Default for CommandResult {
    fn default() -> Self {
        Self {
            language: UNKNOWN.to_string(),
            intent: UNKNOWN.to_string(),
            confidence: 0.0,
            rule_based_intent: UNKNOWN.to_string(),
            rule_based_confidence: 0.0,
            ml_intent: UNKNOWN.to_string(),
            ml_confidence: 0.0,
            entities: Map::new(),
            response_text: NO_RESPONSE.to_string(),
        }
    }
}

impl CommandResult {
    /// Normalize a raw `/api/process` body.
    ///
    /// Missing, null, mistyped and empty-string fields fall back to their
    /// defaults; a body that is not an object yields the default result.
    pub fn from_response(raw: &Value) -> Self {
        let text = |key: &str, default: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let score = |key: &str| raw.get(key).and_then(Value::as_f64).unwrap_or(0.0);

        Self {
            language: text("detected_language", UNKNOWN),
            intent: text("intent", UNKNOWN),
            confidence: score("confidence"),
            rule_based_intent: text("rule_based_intent", UNKNOWN),
            rule_based_confidence: score("rule_based_confidence"),
            ml_intent: text("ml_intent", UNKNOWN),
            ml_confidence: score("ml_confidence"),
            entities: raw
                .get("entities")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            response_text: text("response", NO_RESPONSE),
        }
    }
}

/// Reachability of the NLP service as seen by the console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiHealthStatus {
    #[default]
    Checking,
    Online,
    Offline,
}

impl fmt::Display for ApiHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiHealthStatus::Checking => write!(f, "checking"),
            ApiHealthStatus::Online => write!(f, "online"),
            ApiHealthStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Body of `POST /api/parse-command`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseCommandRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

/// Response of `POST /api/parse-command`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    #[serde(default = "unknown")]
    pub intent: String,
    #[serde(default)]
    pub entities: Map<String, Value>,
    #[serde(default = "unknown")]
    pub language: String,
    /// Rule-based matches report full confidence
    #[serde(default = "full_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub normalized_text: String,
}

fn unknown() -> String { UNKNOWN.to_string() }
fn full_confidence() -> f64 { 1.0 }

/// Response of `GET /api/supported-intents`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportedIntents {
    /// Intent name to example commands
    #[serde(default)]
    pub intents: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub languages: Vec<String>,
}
