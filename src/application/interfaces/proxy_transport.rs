use async_trait::async_trait;

use crate::domain::{ChatCompletion, ChatMessage, ClientError, TransportKind};

/// One way of delivering a conversation from the client to the proxy.
///
/// Both implementations end at the same upstream call; they differ only in
/// the request envelope and where the completion sits in the response.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// Deliver `messages` and return the completion relayed by the proxy.
    ///
    /// Network failures, timeouts and non-success statuses are
    /// [`ClientError::Transport`]; a body without the completion shape is
    /// [`ClientError::Protocol`].
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ClientError>;

    fn kind(&self) -> TransportKind;
}
