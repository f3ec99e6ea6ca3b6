//! Submission controller: one request/response cycle per submitted command
//!
//! At most one submission is in flight. The `loading` flag is checked and set
//! under the state lock before the request is issued, and the lock is never
//! held across the network call.

use crate::client::NlpApi;
use crate::form::{validate_command, CommandForm, FormData, ValidationError};
use crate::model::{CommandResult, LanguagePreference};
use crate::preview::Transcript;
use crate::DebugConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Shown when the service gave no error text of its own
pub const GENERIC_FAILURE: &str =
    "Failed to process your command. Please check the API connection.";

/// Everything the result and preview panes render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<CommandResult>,
    pub transcript: Transcript,
}

/// What happened to a `submit` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank message; nothing was sent
    Ignored,
    /// Another submission is still in flight; nothing was sent
    Busy,
    /// Refused by validation before dispatch
    Rejected(ValidationError),
    Completed(CommandResult),
    /// Request failed; carries the user-visible error
    Failed(String),
    /// The console was reset while the request was in flight
    Superseded,
}

struct Inner {
    view: SubmissionState,
    /// Bumped by `reset` so late responses are dropped
    generation: u64,
    /// Request task of the current submission; aborted by `reset`
    in_flight: Option<AbortHandle>,
}

/// Drives command submissions against an [`NlpApi`]
#[derive(Clone)]
pub struct SubmissionController {
    api: Arc<dyn NlpApi>,
    inner: Arc<Mutex<Inner>>,
    timeout: Duration,
    max_message_chars: usize,
}

impl SubmissionController {
    pub fn new(api: Arc<dyn NlpApi>, config: &DebugConfig) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner {
                view: SubmissionState::default(),
                generation: 0,
                in_flight: None,
            })),
            timeout: config.api.timeout(),
            max_message_chars: config.form.max_message_chars,
        }
    }

    pub async fn state(&self) -> SubmissionState {
        self.inner.lock().await.view.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.view.loading
    }

    /// Submit the form's current contents
    pub async fn submit(&self, form: &CommandForm) -> SubmitOutcome {
        match form.submission() {
            Some(data) => self.submit_data(data).await,
            None => {
                debug!("Ignoring blank command");
                SubmitOutcome::Ignored
            }
        }
    }

    async fn submit_data(&self, data: FormData) -> SubmitOutcome {
        let (generation, previous, task) = {
            let mut inner = self.inner.lock().await;
            if inner.view.loading {
                debug!("Submission already in flight");
                return SubmitOutcome::Busy;
            }
            if let Err(e) = validate_command(&data.message, self.max_message_chars) {
                inner.view.error = Some(e.to_string());
                return SubmitOutcome::Rejected(e);
            }

            let api = Arc::clone(&self.api);
            let message = data.message.clone();
            let language = data.language.wire_value();
            let task =
                tokio::spawn(async move { api.process_command(&message, language).await });
            inner.in_flight = Some(task.abort_handle());

            let previous = inner.view.result.take();
            inner.view.loading = true;
            inner.view.error = None;
            inner.view.transcript = Transcript::user(data.message.clone());
            (inner.generation, previous, task)
        };

        let abort = task.abort_handle();
        let response = tokio::time::timeout(self.timeout, task).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("Dropping response for a reset console");
            return SubmitOutcome::Superseded;
        }
        inner.loading_done();

        let failure = match response {
            Ok(Ok(Ok(raw))) => {
                let result = CommandResult::from_response(&raw);
                info!(
                    intent = %result.intent,
                    language = %result.language,
                    confidence = result.confidence,
                    "Command processed"
                );
                inner.view.transcript.bot = Some(result.response_text.clone());
                inner.view.result = Some(result.clone());
                track_command(&data.message, data.language, true);
                return SubmitOutcome::Completed(result);
            }
            Ok(Ok(Err(e))) => {
                warn!(
                    error = %e,
                    status = ?e.status(),
                    timeout = e.is_timeout(),
                    "Error processing command"
                );
                e.server_error().unwrap_or(GENERIC_FAILURE).to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Command task failed");
                GENERIC_FAILURE.to_string()
            }
            Err(_) => {
                abort.abort();
                warn!(timeout_secs = self.timeout.as_secs(), "Command timed out");
                GENERIC_FAILURE.to_string()
            }
        };

        inner.view.error = Some(failure.clone());
        inner.view.result = previous;
        track_command(&data.message, data.language, false);
        SubmitOutcome::Failed(failure)
    }

    /// Clear result, error, loading and transcript, cancelling any request
    /// still in flight
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(request) = inner.in_flight.take() {
            debug!("Cancelling in-flight command");
            request.abort();
        }
        inner.generation += 1;
        inner.view = SubmissionState::default();
    }
}

impl Inner {
    fn loading_done(&mut self) {
        self.view.loading = false;
        self.in_flight = None;
    }
}

/// Usage event for a finished submission; only a short preview of the text is logged
fn track_command(message: &str, language: LanguagePreference, success: bool) {
    let length = message.chars().count();
    let mut preview: String = message.chars().take(10).collect();
    if length > 10 {
        preview.push_str("...");
    }
    info!(
        target: "nlp_debug::analytics",
        length,
        preview = %preview,
        language = %language,
        success,
        "NLP command"
    );
}
