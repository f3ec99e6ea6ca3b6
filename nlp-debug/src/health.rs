//! NLP service health monitor
//!
//! `checking -> {online, offline}` on start, and `-> checking -> {online, offline}`
//! again on every manual retry. There is no background polling.

use crate::client::NlpApi;
use crate::model::ApiHealthStatus;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Banner text shown while the service is offline
pub fn unavailable_message(base_url: &str) -> String {
    format!(
        "NLP API is not available. Please make sure the API is running at {}",
        base_url
    )
}

/// Snapshot of the monitor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthState {
    pub status: ApiHealthStatus,
    /// Banner error, set only while offline
    pub error: Option<String>,
}

/// Tracks whether the NLP service answers its health endpoint
#[derive(Clone)]
pub struct HealthMonitor {
    api: Arc<dyn NlpApi>,
    state: Arc<Mutex<HealthState>>,
}

impl HealthMonitor {
    /// Create a monitor in the `checking` state
    pub fn new(api: Arc<dyn NlpApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(HealthState::default())),
        }
    }

    pub async fn state(&self) -> HealthState {
        self.state.lock().await.clone()
    }

    pub async fn status(&self) -> ApiHealthStatus {
        self.state.lock().await.status
    }

    /// Query the health endpoint once and record the outcome
    pub async fn check(&self) -> ApiHealthStatus {
        let result = self.api.check_health().await;

        let next = match result {
            Ok(_) => {
                info!(base_url = %self.api.base_url(), "NLP API online");
                HealthState {
                    status: ApiHealthStatus::Online,
                    error: None,
                }
            }
            Err(e) => {
                warn!(base_url = %self.api.base_url(), error = %e, "NLP API offline");
                HealthState {
                    status: ApiHealthStatus::Offline,
                    error: Some(unavailable_message(self.api.base_url())),
                }
            }
        };

        let status = next.status;
        *self.state.lock().await = next;
        status
    }

    /// Reset to `checking`, clear the banner and check again
    pub async fn retry(&self) -> ApiHealthStatus {
        *self.state.lock().await = HealthState::default();
        self.check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{Reply, ScriptedApi};
    use serde_json::json;

    async fn wait_for_health_calls(api: &ScriptedApi, count: usize) {
        while api.health_count() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_starts_checking_then_online() {
        let api = Arc::new(ScriptedApi::new(Reply::Body(json!({}))));
        let monitor = HealthMonitor::new(api.clone());

        assert_eq!(monitor.status().await, ApiHealthStatus::Checking);
        assert_eq!(monitor.check().await, ApiHealthStatus::Online);
        assert_eq!(
            monitor.state().await,
            HealthState {
                status: ApiHealthStatus::Online,
                error: None
            }
        );
        assert_eq!(api.health_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_check_names_base_url() {
        let api = Arc::new(ScriptedApi::new(Reply::Body(json!({}))).unhealthy());
        let monitor = HealthMonitor::new(api);

        assert_eq!(monitor.check().await, ApiHealthStatus::Offline);
        let state = monitor.state().await;
        assert_eq!(
            state.error.as_deref(),
            Some(
                "NLP API is not available. \
                 Please make sure the API is running at http://nlp.test:5000"
            )
        );
    }

    #[tokio::test]
    async fn test_retry_passes_through_checking() {
        let api = Arc::new(ScriptedApi::new(Reply::Body(json!({}))).unhealthy().gated_health());
        let monitor = HealthMonitor::new(api.clone());

        api.release_health();
        assert_eq!(monitor.check().await, ApiHealthStatus::Offline);

        api.set_healthy(true);
        let retrying = monitor.clone();
        let handle = tokio::spawn(async move { retrying.retry().await });

        wait_for_health_calls(&api, 2).await;
        assert_eq!(monitor.state().await, HealthState::default());

        api.release_health();
        assert_eq!(handle.await.unwrap(), ApiHealthStatus::Online);
        assert_eq!(monitor.state().await.error, None);
        assert_eq!(api.health_count(), 2);
    }
}
