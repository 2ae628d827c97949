use serde::Serialize;

use super::{ChatMessage, DisplayMessage};

/// Ordered, append-only record of one chat session.
///
/// Lives only in memory; [`Transcript::clear`] discards everything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<DisplayMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) -> &DisplayMessage {
        self.messages.push(DisplayMessage::new(message));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&DisplayMessage> {
        self.messages.last()
    }

    /// Wire form of the transcript, in order, without display metadata.
    pub fn to_wire(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(|m| m.message().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
