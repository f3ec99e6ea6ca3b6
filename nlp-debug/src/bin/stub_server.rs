//! Stub NLP API server
//!
//! Usage:
//!   nlp-stub-server [--port <PORT>] [--fail <STATUS> <MESSAGE>] [--unhealthy]

use anyhow::{Context, Result};
use axum::http::StatusCode;
use nlp_debug::stub::{create_router, StubState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_PORT: u16 = 5000;

fn parse_state(args: &[String]) -> Result<(u16, StubState)> {
    let mut port = DEFAULT_PORT;
    let mut state = StubState::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                i += 1;
                let value = args.get(i).context("--port needs a value")?;
                port = value
                    .parse()
                    .with_context(|| format!("Invalid port: {}", value))?;
            }
            "--fail" => {
                let status = args.get(i + 1).context("--fail needs a status code")?;
                let message = args.get(i + 2).context("--fail needs an error message")?;
                let status = status
                    .parse::<u16>()
                    .ok()
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .with_context(|| format!("Invalid status code: {}", status))?;
                let healthy = state.healthy;
                state = StubState::failing(status, message.clone());
                state.healthy = healthy;
                i += 2;
            }
            "--unhealthy" => {
                state.healthy = false;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: nlp-stub-server [--port <PORT>] \
                     [--fail <STATUS> <MESSAGE>] [--unhealthy]"
                );
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
        i += 1;
    }

    Ok((port, state))
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting NLP stub server v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let (port, state) = parse_state(&args)?;

    info!(
        healthy = state.healthy,
        failure = ?state.failure.as_ref().map(|f| f.status.as_u16()),
        "Stub configured"
    );

    let app = create_router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
