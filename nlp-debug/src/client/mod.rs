//! NLP service client abstraction and HTTP implementation

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpNlpClient;

use crate::model::{ParsedCommand, SupportedIntents};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const HEALTH_PATH: &str = "/api/health";
pub const PROCESS_PATH: &str = "/api/process";
pub const PARSE_COMMAND_PATH: &str = "/api/parse-command";
pub const SUPPORTED_INTENTS_PATH: &str = "/api/supported-intents";

/// Why a single request to the NLP service failed
#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .server_error.as_deref().unwrap_or("no error details"))]
    Status {
        status: u16,
        /// `error` string from a JSON error body, if the server sent one
        server_error: Option<String>,
    },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Timeout waiting for response")]
    Timeout,
}

impl RequestFailure {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestFailure::Timeout
        } else if err.is_connect() {
            RequestFailure::Connection(err.to_string())
        } else {
            RequestFailure::Http(err)
        }
    }
}

/// Errors returned by [`NlpApi`] operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Health check failed: {0}")]
    HealthCheck(#[source] RequestFailure),

    #[error("Failed to process command: {0}")]
    ProcessCommand(#[source] RequestFailure),

    #[error("Failed to parse command: {0}")]
    ParseCommand(#[source] RequestFailure),

    #[error("Failed to fetch supported intents: {0}")]
    SupportedIntents(#[source] RequestFailure),

    #[error("Failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    fn failure(&self) -> Option<&RequestFailure> {
        match self {
            ClientError::HealthCheck(f)
            | ClientError::ProcessCommand(f)
            | ClientError::ParseCommand(f)
            | ClientError::SupportedIntents(f) => Some(f),
            ClientError::Build(_) => None,
        }
    }

    /// Server-supplied error text, if the service answered with one
    pub fn server_error(&self) -> Option<&str> {
        match self.failure()? {
            RequestFailure::Status { server_error, .. } => server_error.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a non-2xx answer
    pub fn status(&self) -> Option<u16> {
        match self.failure()? {
            RequestFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.failure(), Some(RequestFailure::Timeout))
    }
}

/// Extract the `error` string from a JSON error body
pub(crate) fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Operations the console performs against the NLP service
#[async_trait]
pub trait NlpApi: Send + Sync {
    /// Base URL the client talks to, for display
    fn base_url(&self) -> &str;

    /// `GET /api/health`; any 2xx answer is healthy
    async fn check_health(&self) -> Result<Value, ClientError>;

    /// `POST /api/process`; `language_preference` is `None` for auto-detect
    async fn process_command(
        &self,
        message: &str,
        language_preference: Option<&str>,
    ) -> Result<Value, ClientError>;

    /// `POST /api/parse-command`
    async fn parse_command(
        &self,
        message: &str,
        user_id: Option<&str>,
    ) -> Result<ParsedCommand, ClientError>;

    /// `GET /api/supported-intents`
    async fn supported_intents(&self) -> Result<SupportedIntents, ClientError>;
}
