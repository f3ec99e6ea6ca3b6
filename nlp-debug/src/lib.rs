//! NLP Debug Console - exercise the multilingual WhatsApp command NLP API
//!
//! This crate provides:
//! - An HTTP client for the NLP service (`/api/health`, `/api/process`, ...)
//! - A health monitor and a single-flight submission controller
//! - Plain-text renderers for the analysis result and the chat transcript
//! - A stub backend serving the documented request/response contract

pub mod client;
pub mod console;
pub mod controller;
pub mod form;
pub mod health;
pub mod model;
pub mod preview;
pub mod render;
pub mod samples;
pub mod stub;

pub use client::{ClientError, HttpNlpClient, NlpApi};
pub use console::DebugConsole;
pub use controller::{SubmissionController, SubmitOutcome};
pub use health::HealthMonitor;
pub use model::{ApiHealthStatus, CommandResult, LanguagePreference};

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "NLP_API_BASE_URL";

/// Errors loading the console configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the debug console
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    /// NLP service connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Command form limits
    #[serde(default)]
    pub form: FormConfig,
}

/// Connection settings for the NLP service
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the NLP service, without the `/api/...` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Config pointing at `base_url` with the default timeout
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL for an endpoint path such as `/api/health`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Limits applied to the command form before dispatch
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Maximum message length in characters, measured on the trimmed text
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_base_url() -> String { "http://localhost:5000".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_message_chars() -> usize { 500 }

impl DebugConfig {
    /// Parse a TOML document; every missing key takes its default
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from an optional TOML file, then apply `NLP_API_BASE_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };

        Ok(config.with_base_url_override(std::env::var(BASE_URL_ENV).ok()))
    }

    /// Replace the base URL when an override is present and non-blank
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self
    }
}
