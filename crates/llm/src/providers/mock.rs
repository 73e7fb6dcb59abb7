//! Scripted client for tests and offline development.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::providers::missing_key_error;
use docchat_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

/// One scripted outcome.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Failure(String),
    RejectedKey(String),
}

/// Mock provider that replays scripted replies in order.
///
/// Every request is recorded. A gated mock parks each call until the test
/// releases it, which makes "request still in flight" observable.
#[derive(Debug, Default)]
pub struct MockClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<LlmRequest>>,
    missing_key_env: Option<String>,
    gate: Option<Semaphore>,
}

impl MockClient {
    /// Create a mock with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose calls wait for [`MockClient::release`].
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Create a mock that reports a missing credential.
    pub fn without_credentials(api_key_env: impl Into<String>) -> Self {
        Self {
            missing_key_env: Some(api_key_env.into()),
            ..Self::default()
        }
    }

    /// Queue a successful text reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(MockReply::Text(text.into()))
    }

    /// Queue a transport/API failure.
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.push(MockReply::Failure(message.into()))
    }

    /// Queue a rejected-credential failure.
    pub fn push_rejected_key(&self, message: impl Into<String>) -> &Self {
        self.push(MockReply::RejectedKey(message.into()))
    }

    fn push(&self, reply: MockReply) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Let `calls` parked (or future) calls proceed.
    pub fn release(&self, calls: usize) {
        if let Some(ref gate) = self.gate {
            gate.add_permits(calls);
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn check_credentials(&self) -> AppResult<()> {
        match self.missing_key_env {
            Some(ref env) => Err(missing_key_error(env)),
            None => Ok(()),
        }
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.check_credentials()?;

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(ref gate) = self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| AppError::Llm(format!("mock gate closed: {}", e)))?;
            permit.forget();
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());

        match reply {
            Some(MockReply::Text(content)) => Ok(LlmResponse {
                usage: LlmUsage::new(
                    request.prompt.split_whitespace().count() as u32,
                    content.split_whitespace().count() as u32,
                ),
                content,
                model: request.model.clone(),
                finish_reason: Some("STOP".to_string()),
            }),
            Some(MockReply::Failure(message)) => Err(AppError::Llm(message)),
            Some(MockReply::RejectedKey(message)) => Err(AppError::Credential(message)),
            None => Err(AppError::Llm("mock: no scripted reply left".to_string())),
        }
    }
}
