//! reqwest-backed client for the NLP service

use super::{
    server_error_message, ClientError, NlpApi, RequestFailure, HEALTH_PATH, PARSE_COMMAND_PATH,
    PROCESS_PATH, SUPPORTED_INTENTS_PATH,
};
use crate::model::{CommandRequest, ParseCommandRequest, ParsedCommand, SupportedIntents};
use crate::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP client for a single NLP service instance
pub struct HttpNlpClient {
    client: Client,
    config: ApiConfig,
}

impl HttpNlpClient {
    /// Create a client for the configured base URL and timeout
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Build)?;

        let config = ApiConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        Ok(Self { client, config })
    }

    /// Send a request and return the body of a 2xx answer
    async fn send(&self, request: RequestBuilder) -> Result<String, RequestFailure> {
        let start = Instant::now();
        let response = request.send().await.map_err(RequestFailure::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(RequestFailure::from_transport)?;

        debug!(
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            body_len = body.len(),
            "NLP API responded"
        );

        if !status.is_success() {
            return Err(RequestFailure::Status {
                status: status.as_u16(),
                server_error: server_error_message(&body),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestFailure> {
        let body = self.send(self.client.get(self.config.endpoint(path))).await?;
        serde_json::from_str(&body).map_err(|e| RequestFailure::InvalidBody(e.to_string()))
    }
}

/// Lenient decode for bodies whose fields are all optional
fn json_or_null(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        warn!(error = %e, "NLP API returned a non-JSON body");
        Value::Null
    })
}

#[async_trait]
impl NlpApi for HttpNlpClient {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn check_health(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint(HEALTH_PATH);
        debug!(url = %url, "Checking NLP API health");

        match self.send(self.client.get(&url)).await {
            Ok(body) => Ok(json_or_null(&body)),
            Err(e) => {
                warn!(url = %url, error = %e, "Health check failed");
                Err(ClientError::HealthCheck(e))
            }
        }
    }

    async fn process_command(
        &self,
        message: &str,
        language_preference: Option<&str>,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint(PROCESS_PATH);
        let request = CommandRequest {
            message: message.to_string(),
            language_preference: language_preference.map(str::to_string),
        };
        debug!(url = %url, language = ?language_preference, "Processing command");

        match self.send(self.client.post(&url).json(&request)).await {
            Ok(body) => Ok(json_or_null(&body)),
            Err(e) => {
                warn!(url = %url, error = %e, "Process command failed");
                Err(ClientError::ProcessCommand(e))
            }
        }
    }

    async fn parse_command(
        &self,
        message: &str,
        user_id: Option<&str>,
    ) -> Result<ParsedCommand, ClientError> {
        let url = self.config.endpoint(PARSE_COMMAND_PATH);
        let request = ParseCommandRequest {
            message: message.to_string(),
            user_id: user_id.map(str::to_string),
            context: Map::new(),
        };

        let body = self
            .send(self.client.post(&url).json(&request))
            .await
            .map_err(ClientError::ParseCommand)?;

        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseCommand(RequestFailure::InvalidBody(e.to_string())))
    }

    async fn supported_intents(&self) -> Result<SupportedIntents, ClientError> {
        self.get_json(SUPPORTED_INTENTS_PATH)
            .await
            .map_err(ClientError::SupportedIntents)
    }
}
