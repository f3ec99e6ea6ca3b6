//! Stub NLP backend
//!
//! Serves the request/response contract the console expects with canned
//! data, so the console can be driven without the real NLP service. It does
//! not classify anything.

use crate::model::{CommandRequest, ParseCommandRequest, ParsedCommand, SupportedIntents};
use crate::samples;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Error every `/api/process` call answers with
#[derive(Debug, Clone)]
pub struct StubFailure {
    pub status: StatusCode,
    pub message: String,
}

/// Stub state
pub struct StubState {
    /// Body returned by `/api/process`
    pub response: Value,
    pub failure: Option<StubFailure>,
    /// `false` makes `/api/health` answer 503
    pub healthy: bool,
    pub intents: SupportedIntents,
    received: Mutex<Vec<CommandRequest>>,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            response: samples::example_response(),
            failure: None,
            healthy: true,
            intents: default_intents(),
            received: Mutex::new(Vec::new()),
        }
    }
}

impl StubState {
    /// Answer every process call with `status` and `{"error": message}`
    pub fn failing(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            failure: Some(StubFailure {
                status,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Default::default()
        }
    }

    /// Process requests received so far, oldest first
    pub async fn received(&self) -> Vec<CommandRequest> {
        self.received.lock().await.clone()
    }
}

/// Intent table served by `/api/supported-intents`
pub fn default_intents() -> SupportedIntents {
    let table: [(&str, [&str; 2]); 6] = [
        ("get_inventory", ["Show my products", "List all products"]),
        ("get_low_stock", ["Show low stock items", "List products with low stock"]),
        ("get_report", ["Send today's report", "Get this week's report"]),
        ("add_product", ["Add new product Rice 50rs 20qty", "Create product Sugar 25 15"]),
        ("edit_stock", ["Edit stock of Rice to 100", "Update Wheat stock to 75"]),
        ("get_orders", ["Show my orders", "List recent orders"]),
    ];

    SupportedIntents {
        intents: table
            .into_iter()
            .map(|(intent, examples)| {
                (intent.to_string(), examples.iter().map(|e| e.to_string()).collect())
            })
            .collect::<BTreeMap<_, _>>(),
        languages: vec!["en".to_string(), "hi".to_string()],
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the stub router
pub fn create_router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/process", post(process_command))
        .route("/api/parse-command", post(parse_command))
        .route("/api/supported-intents", get(supported_intents))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<StubState>>) -> Response {
    if !state.healthy {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "NLP engine not loaded"})),
        )
            .into_response();
    }

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
    .into_response()
}

/// Canned analysis; an explicit language preference is echoed as the detected language
async fn process_command(
    State(state): State<Arc<StubState>>,
    Json(request): Json<CommandRequest>,
) -> Response {
    debug!(
        message_len = request.message.len(),
        language = ?request.language_preference,
        "Stub process"
    );
    state.received.lock().await.push(request.clone());

    if let Some(failure) = &state.failure {
        return (failure.status, Json(json!({"error": failure.message}))).into_response();
    }

    let mut body = state.response.clone();
    if let (Some(language), Some(fields)) = (request.language_preference, body.as_object_mut()) {
        fields.insert("detected_language".to_string(), Value::String(language));
    }
    Json(body).into_response()
}

async fn parse_command(
    State(state): State<Arc<StubState>>,
    Json(request): Json<ParseCommandRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Message cannot be empty"})),
        )
            .into_response();
    }

    let field = |key: &str| {
        state
            .response
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    };

    Json(ParsedCommand {
        intent: field("intent"),
        entities: Map::new(),
        language: field("detected_language"),
        confidence: 1.0,
        normalized_text: request.message.trim().to_lowercase(),
        raw_text: request.message,
    })
    .into_response()
}

async fn supported_intents(State(state): State<Arc<StubState>>) -> Json<SupportedIntents> {
    Json(state.intents.clone())
}
