//! Scripted [`NlpApi`] used by the controller and console tests

use super::{ClientError, NlpApi, RequestFailure};
use crate::model::{ParsedCommand, SupportedIntents};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

/// What `process_command` answers with
#[derive(Clone)]
pub(crate) enum Reply {
    Body(Value),
    Status(u16, Option<String>),
    Unreachable,
}

pub(crate) struct ScriptedApi {
    healthy: AtomicBool,
    reply: Mutex<Reply>,
    /// When set, calls wait for a permit before answering
    health_gate: Option<Semaphore>,
    process_gate: Option<Semaphore>,
    pub health_calls: AtomicUsize,
    pub process_calls: Mutex<Vec<(String, Option<String>)>>,
    /// Process calls that got past the gate and answered
    pub process_answered: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(reply: Reply) -> Self {
        Self {
            healthy: AtomicBool::new(true),
            reply: Mutex::new(reply),
            health_gate: None,
            process_gate: None,
            health_calls: AtomicUsize::new(0),
            process_calls: Mutex::new(Vec::new()),
            process_answered: AtomicUsize::new(0),
        }
    }

    pub fn unhealthy(self) -> Self {
        self.healthy.store(false, Ordering::SeqCst);
        self
    }

    pub fn gated_health(mut self) -> Self {
        self.health_gate = Some(Semaphore::new(0));
        self
    }

    pub fn gated_process(mut self) -> Self {
        self.process_gate = Some(Semaphore::new(0));
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn release_health(&self) {
        self.health_gate.as_ref().unwrap().add_permits(1);
    }

    pub fn release_process(&self) {
        self.process_gate.as_ref().unwrap().add_permits(1);
    }

    pub fn health_count(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn process_count(&self) -> usize {
        self.process_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NlpApi for ScriptedApi {
    fn base_url(&self) -> &str {
        "http://nlp.test:5000"
    }

    async fn check_health(&self) -> Result<Value, ClientError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.health_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.healthy.load(Ordering::SeqCst) {
            Ok(serde_json::json!({"status": "healthy"}))
        } else {
            Err(ClientError::HealthCheck(RequestFailure::Connection(
                "connection refused".to_string(),
            )))
        }
    }

    async fn process_command(
        &self,
        message: &str,
        language_preference: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.process_calls
            .lock()
            .unwrap()
            .push((message.to_string(), language_preference.map(str::to_string)));
        if let Some(gate) = &self.process_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.process_answered.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status, server_error) => Err(ClientError::ProcessCommand(
                RequestFailure::Status { status, server_error },
            )),
            Reply::Unreachable => Err(ClientError::ProcessCommand(RequestFailure::Connection(
                "connection refused".to_string(),
            ))),
        }
    }

    async fn parse_command(
        &self,
        message: &str,
        _user_id: Option<&str>,
    ) -> Result<ParsedCommand, ClientError> {
        Ok(ParsedCommand {
            intent: "get_inventory".to_string(),
            entities: Default::default(),
            language: "en".to_string(),
            confidence: 1.0,
            raw_text: message.to_string(),
            normalized_text: message.trim().to_lowercase(),
        })
    }

    async fn supported_intents(&self) -> Result<SupportedIntents, ClientError> {
        Ok(SupportedIntents::default())
    }
}
