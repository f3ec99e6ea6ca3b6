//! End-to-end console flows over HTTP against the stub backend

use axum::http::StatusCode;
use nlp_debug::client::RequestFailure;
use nlp_debug::stub::{create_router, StubState};
use nlp_debug::{
    ApiHealthStatus, ClientError, DebugConfig, DebugConsole, HttpNlpClient, LanguagePreference,
    NlpApi, SubmitOutcome,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn serve_on(listener: TcpListener, state: Arc<StubState>) {
    let app = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Start a stub on an ephemeral port and return its base URL
async fn spawn_stub(state: Arc<StubState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve_on(listener, state).await;
    format!("http://{}", addr)
}

fn config_for(base_url: &str) -> DebugConfig {
    DebugConfig::default().with_base_url_override(Some(base_url.to_string()))
}

#[tokio::test]
async fn test_inventory_command_end_to_end() {
    let state = Arc::new(StubState::default());
    let base_url = spawn_stub(state.clone()).await;
    let mut console = DebugConsole::connect(config_for(&base_url)).unwrap();

    assert_eq!(console.start().await, ApiHealthStatus::Online);

    let outcome = console.submit_message("Show my inventory").await;
    let SubmitOutcome::Completed(result) = outcome else {
        panic!("expected a completed submission, got {:?}", outcome);
    };
    assert_eq!(result.language, "en");
    assert_eq!(result.intent, "inventory_query");
    assert_eq!(result.confidence, 0.95);
    assert_eq!(result.ml_confidence, 0.98);
    assert_eq!(result.entities.len(), 3);

    let received = state.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, "Show my inventory");
    assert_eq!(received[0].language_preference, None);

    let snapshot = console.snapshot().await;
    assert!(!snapshot.submission.loading);
    assert_eq!(snapshot.submission.error, None);
    assert_eq!(snapshot.submission.transcript.user.as_deref(), Some("Show my inventory"));
    assert!(snapshot
        .submission
        .transcript
        .bot
        .as_deref()
        .unwrap()
        .starts_with("Here is your current inventory"));
}

#[tokio::test]
async fn test_language_preference_on_the_wire() {
    let state = Arc::new(StubState::default());
    let base_url = spawn_stub(state.clone()).await;
    let mut console = DebugConsole::connect(config_for(&base_url)).unwrap();

    console.set_language(LanguagePreference::Hindi);
    let outcome = console.submit_message("मेरे ऑर्डर दिखाओ").await;
    let SubmitOutcome::Completed(result) = outcome else {
        panic!("expected a completed submission, got {:?}", outcome);
    };
    assert_eq!(result.language, "hi");

    console.set_language(LanguagePreference::Auto);
    console.submit_message("Stock dikhao").await;

    let received = state.received().await;
    assert_eq!(received[0].language_preference.as_deref(), Some("hi"));
    assert_eq!(received[1].language_preference, None);
}

#[tokio::test]
async fn test_server_error_text_is_shown() {
    let state = Arc::new(StubState::failing(StatusCode::TOO_MANY_REQUESTS, "Rate limited"));
    let base_url = spawn_stub(state).await;
    let mut console = DebugConsole::connect(config_for(&base_url)).unwrap();

    let outcome = console.submit_message("Show my orders").await;
    assert_eq!(outcome, SubmitOutcome::Failed("Rate limited".to_string()));

    let snapshot = console.snapshot().await;
    assert_eq!(snapshot.submission.error.as_deref(), Some("Rate limited"));
    assert_eq!(snapshot.submission.result, None);
    assert!(!snapshot.submission.loading);
}

#[tokio::test]
async fn test_offline_then_retry_after_server_starts() {
    // Reserve a port, then release it so the first health check is refused
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);

    let base_url = format!("http://{}", addr);
    let console = DebugConsole::connect(config_for(&base_url)).unwrap();

    assert_eq!(console.start().await, ApiHealthStatus::Offline);
    let health = console.snapshot().await.health;
    assert!(health.error.unwrap().contains(&base_url));

    let listener = TcpListener::bind(addr).await.unwrap();
    serve_on(listener, Arc::new(StubState::default())).await;

    assert_eq!(console.retry_health().await, ApiHealthStatus::Online);
    assert_eq!(console.snapshot().await.health.error, None);
}

#[tokio::test]
async fn test_unhealthy_service_is_offline() {
    let base_url = spawn_stub(Arc::new(StubState::unhealthy())).await;
    let console = DebugConsole::connect(config_for(&base_url)).unwrap();

    assert_eq!(console.start().await, ApiHealthStatus::Offline);
}

#[tokio::test]
async fn test_parse_command_and_intents() {
    let base_url = spawn_stub(Arc::new(StubState::default())).await;
    let client = HttpNlpClient::new(config_for(&base_url).api).unwrap();

    let parsed = client.parse_command("  Show My Inventory ", Some("42")).await.unwrap();
    assert_eq!(parsed.intent, "inventory_query");
    assert_eq!(parsed.normalized_text, "show my inventory");
    assert_eq!(parsed.raw_text, "  Show My Inventory ");
    assert_eq!(parsed.confidence, 1.0);

    let err = client.parse_command("   ", None).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::ParseCommand(RequestFailure::Status { status: 400, .. })
    ));

    let intents = client.supported_intents().await.unwrap();
    assert!(intents.intents.contains_key("get_low_stock"));
    assert_eq!(intents.languages, vec!["en", "hi"]);
}

#[tokio::test]
async fn test_health_body_reports_version() {
    let base_url = spawn_stub(Arc::new(StubState::default())).await;
    let client = HttpNlpClient::new(config_for(&format!("{}/", base_url)).api).unwrap();

    assert_eq!(client.base_url(), base_url);
    let body = client.check_health().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
