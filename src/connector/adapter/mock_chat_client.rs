use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ChatClient;
use crate::domain::{ChatCompletion, ChatMessage, DomainError, Role, Usage};

/// Deterministic stand-in for the upstream provider.
///
/// Echoes the last user message unless a fixed reply is set, and counts
/// every call so tests can assert whether the upstream was reached.
pub struct MockChatClient {
    reply: Option<String>,
    delay: Option<Duration>,
    fail_status: Option<u16>,
    calls: AtomicUsize,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            reply: None,
            delay: None,
            fail_status: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_with(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply_for(&self, messages: &[ChatMessage]) -> String {
        if let Some(reply) = &self.reply {
            return reply.clone();
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        format!("Echo: {}", last_user)
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.fail_status {
            return Err(DomainError::upstream(status, "mock upstream failure"));
        }

        let reply = self.reply_for(messages);
        debug!("Mock upstream replying with {} chars", reply.len());

        let prompt_tokens: u64 = messages
            .iter()
            .map(|m| m.content.split_whitespace().count() as u64)
            .sum();
        let completion_tokens = reply.split_whitespace().count() as u64;

        Ok(ChatCompletion::from_reply(reply)
            .with_model(self.model_name())
            .with_usage(Usage {
                prompt_tokens: Some(prompt_tokens),
                completion_tokens: Some(completion_tokens),
                total_tokens: Some(prompt_tokens + completion_tokens),
                ..Usage::default()
            }))
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}
