//! Root console: owns the form and wires it to the health monitor and
//! submission controller

use crate::client::{ClientError, HttpNlpClient, NlpApi};
use crate::controller::{SubmissionController, SubmissionState, SubmitOutcome};
use crate::form::CommandForm;
use crate::health::{HealthMonitor, HealthState};
use crate::model::{ApiHealthStatus, LanguagePreference};
use crate::samples::{self, SampleCommand};
use crate::DebugConfig;
use std::sync::Arc;
use tracing::info;

/// Everything needed to draw the console once
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSnapshot {
    pub health: HealthState,
    pub submission: SubmissionState,
    pub form: CommandForm,
}

pub struct DebugConsole {
    config: DebugConfig,
    api: Arc<dyn NlpApi>,
    form: CommandForm,
    health: HealthMonitor,
    controller: SubmissionController,
}

impl DebugConsole {
    pub fn new(config: DebugConfig, api: Arc<dyn NlpApi>) -> Self {
        Self {
            health: HealthMonitor::new(Arc::clone(&api)),
            controller: SubmissionController::new(Arc::clone(&api), &config),
            form: CommandForm::new(),
            config,
            api,
        }
    }

    /// Console backed by an HTTP client for `config.api`
    pub fn connect(config: DebugConfig) -> Result<Self, ClientError> {
        let client = HttpNlpClient::new(config.api.clone())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<dyn NlpApi> {
        &self.api
    }

    pub fn form(&self) -> &CommandForm {
        &self.form
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.form.set_message(message);
    }

    pub fn set_language(&mut self, language: LanguagePreference) {
        self.form.set_language(language);
    }

    /// Copy a canned command into the form (1-based), keeping the language
    pub fn select_sample(&mut self, number: usize) -> Option<&'static SampleCommand> {
        let sample = samples::command(number)?;
        self.form.set_message(sample.text);
        Some(sample)
    }

    /// Initial health check
    pub async fn start(&self) -> ApiHealthStatus {
        info!(base_url = %self.api.base_url(), "Starting debug console");
        self.health.check().await
    }

    pub async fn retry_health(&self) -> ApiHealthStatus {
        self.health.retry().await
    }

    /// Submit the form's current contents
    pub async fn submit(&self) -> SubmitOutcome {
        self.controller.submit(&self.form).await
    }

    /// Set the message and submit it in one step
    pub async fn submit_message(&mut self, message: impl Into<String>) -> SubmitOutcome {
        self.form.set_message(message);
        self.submit().await
    }

    /// Clear result, error, loading state, transcript and form
    pub async fn reset(&mut self) {
        self.controller.reset().await;
        self.form = CommandForm::new();
        info!("Console reset");
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            health: self.health.state().await,
            submission: self.controller.state().await,
            form: self.form.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{Reply, ScriptedApi};
    use crate::preview::render_preview;
    use crate::render::render_result;
    use chrono::NaiveTime;

    fn console(api: Arc<ScriptedApi>) -> DebugConsole {
        DebugConsole::new(DebugConfig::default(), api)
    }

    #[tokio::test]
    async fn test_sample_to_rendered_result() {
        let api = Arc::new(ScriptedApi::new(Reply::Body(samples::example_response())));
        let mut console = console(api.clone());

        assert_eq!(console.snapshot().await.health.status, ApiHealthStatus::Checking);
        assert_eq!(console.start().await, ApiHealthStatus::Online);

        console.set_language(LanguagePreference::English);
        let sample = console.select_sample(1).unwrap();
        assert_eq!(sample.text, "Show my inventory");
        assert_eq!(console.form().language(), LanguagePreference::English);

        assert!(matches!(console.submit().await, SubmitOutcome::Completed(_)));
        assert_eq!(
            *api.process_calls.lock().unwrap(),
            vec![("Show my inventory".to_string(), Some("en".to_string()))]
        );

        let snapshot = console.snapshot().await;
        let result = snapshot.submission.result.as_ref().unwrap();
        let lines = render_result(result);
        assert!(lines.contains(&"  en (English)".to_string()));
        assert!(lines.contains(&"  inventory_query  95.0% confidence".to_string()));

        let preview = render_preview(
            &snapshot.submission.transcript,
            80,
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        assert!(preview.iter().any(|l| l.ends_with("Show my inventory")));
        assert!(preview.iter().any(|l| l.starts_with("Here is your current inventory")));
    }

    #[tokio::test]
    async fn test_offline_then_retry() {
        let api = Arc::new(ScriptedApi::new(Reply::Body(samples::example_response())).unhealthy());
        let console = console(api.clone());

        assert_eq!(console.start().await, ApiHealthStatus::Offline);
        let banner = console.snapshot().await.health.error.unwrap();
        assert!(banner.contains("http://nlp.test:5000"));

        api.set_healthy(true);
        assert_eq!(console.retry_health().await, ApiHealthStatus::Online);
        assert_eq!(api.health_count(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let api = Arc::new(ScriptedApi::new(Reply::Status(500, Some("boom".to_string()))));
        let mut console = console(api);

        console.set_language(LanguagePreference::Hindi);
        let outcome = console.submit_message("मेरे ऑर्डर दिखाओ").await;
        assert_eq!(outcome, SubmitOutcome::Failed("boom".to_string()));

        console.reset().await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.submission, SubmissionState::default());
        assert_eq!(snapshot.form, CommandForm::new());
    }

    #[test]
    fn test_unknown_sample_leaves_form() {
        let api = Arc::new(ScriptedApi::new(Reply::Unreachable));
        let mut console = console(api);
        console.set_message("Show my orders");
        assert!(console.select_sample(99).is_none());
        assert_eq!(console.form().message(), "Show my orders");
    }
}
