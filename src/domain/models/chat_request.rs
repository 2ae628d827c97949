use serde::Serialize;
use serde_json::Value;

use super::{ChatMessage, Role};
use crate::domain::DomainError;

/// A validated, non-empty, ordered list of messages ready to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Result<Self, DomainError> {
        if messages.is_empty() {
            return Err(DomainError::validation(
                "Invalid request format: messages must be a non-empty array",
            ));
        }
        for (i, message) in messages.iter().enumerate() {
            if message.content.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "Invalid request format: messages[{i}].content must be a non-empty string"
                )));
            }
        }
        Ok(Self { messages })
    }

    /// Validate an untyped `messages` value taken from a request body.
    ///
    /// Walks the value by hand so the caller gets an error naming the
    /// offending entry instead of a serde path.
    pub fn from_messages_value(value: Option<&Value>) -> Result<Self, DomainError> {
        let entries = match value {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(DomainError::validation(
                    "Invalid request format: messages must be an array",
                ))
            }
            None => {
                return Err(DomainError::validation(
                    "Invalid request format: messages is required",
                ))
            }
        };

        let mut messages = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let role = entry
                .get("role")
                .and_then(Value::as_str)
                .and_then(Role::parse)
                .ok_or_else(|| {
                    DomainError::validation(format!(
                        "Invalid request format: messages[{i}].role must be one of user, assistant, system"
                    ))
                })?;
            let content = entry.get("content").and_then(Value::as_str).ok_or_else(|| {
                DomainError::validation(format!(
                    "Invalid request format: messages[{i}].content must be a string"
                ))
            })?;
            messages.push(ChatMessage::new(role, content));
        }

        Self::new(messages)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_messages() {
        let body = json!({"messages": [{"role": "user", "content": "hi"}]});
        let request = ChatRequest::from_messages_value(body.get("messages")).unwrap();
        assert_eq!(request.messages(), &[ChatMessage::user("hi")]);
    }

    #[test]
    fn rejects_missing_and_empty_lists() {
        let missing = ChatRequest::from_messages_value(None).unwrap_err();
        assert!(missing.is_validation());

        let empty = json!([]);
        let err = ChatRequest::from_messages_value(Some(&empty)).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn rejects_non_array() {
        let value = json!("hello");
        assert!(ChatRequest::from_messages_value(Some(&value)).is_err());
    }

    #[test]
    fn names_the_offending_entry() {
        let value = json!([
            {"role": "user", "content": "hi"},
            {"role": "robot", "content": "beep"}
        ]);
        let err = ChatRequest::from_messages_value(Some(&value)).unwrap_err();
        assert!(err.to_string().contains("messages[1].role"));

        let value = json!([{"role": "user", "content": 42}]);
        let err = ChatRequest::from_messages_value(Some(&value)).unwrap_err();
        assert!(err.to_string().contains("messages[0].content"));
    }

    #[test]
    fn rejects_blank_content() {
        let err = ChatRequest::new(vec![ChatMessage::user("   ")]).unwrap_err();
        assert!(err.is_validation());
    }
}
