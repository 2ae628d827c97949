use tracing::{info, warn};

use crate::application::SendMessageUseCase;
use crate::domain::{ChatMessage, ClientError, DisplayMessage, Transcript};

/// Reply shown when the proxy answered without a usable completion.
pub const NO_ANSWER_FALLBACK: &str = "I cannot answer that.";

/// One conversation with the proxy.
///
/// Every accepted submission appends a user message followed by exactly one
/// assistant message, either the reply or a natural-language fallback, so the
/// transcript stays coherent after a failed exchange. `submit` borrows the
/// session mutably, which keeps a single exchange in flight.
pub struct ChatSession {
    sender: SendMessageUseCase,
    transcript: Transcript,
    last_error: Option<String>,
}

impl ChatSession {
    pub fn new(sender: SendMessageUseCase) -> Self {
        Self {
            sender,
            transcript: Transcript::new(),
            last_error: None,
        }
    }

    /// Send `content` with the full history; returns the assistant message
    /// appended to the transcript, or `None` for blank input.
    pub async fn submit(&mut self, content: &str) -> Option<&DisplayMessage> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        self.last_error = None;
        self.transcript.push(ChatMessage::user(content));

        let reply = match self.sender.execute(&self.transcript.to_wire()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Exchange failed: {}", e);
                let fallback = fallback_reply(&e);
                self.last_error = Some(e.to_string());
                fallback
            }
        };

        info!("Transcript now holds {} messages", self.transcript.len() + 1);
        Some(self.transcript.push(ChatMessage::assistant(reply)))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear(&mut self) {
        info!("Clearing transcript");
        self.transcript.clear();
        self.last_error = None;
    }
}

/// Assistant text rendered in place of a failed exchange.
pub fn fallback_reply(error: &ClientError) -> String {
    match error {
        ClientError::Protocol(_) => NO_ANSWER_FALLBACK.to_string(),
        other => format!("An error occurred: {}", other),
    }
}
