use async_trait::async_trait;

use crate::domain::{ChatCompletion, ChatMessage, DomainError};

/// Sends a conversation to the upstream LLM provider and returns its completion.
///
/// Implementors own transport, authentication and serialization; the proxy
/// only sees the validated message list and the parsed completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, DomainError>;

    /// Model requested from the provider
    fn model_name(&self) -> &str;
}
