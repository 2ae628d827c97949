use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Role;

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Provider counters such as `prompt_cache_hit_tokens`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn assistant_role() -> String {
    Role::Assistant.as_str().to_string()
}

/// Message inside a completion choice.
///
/// Looser than [`super::ChatMessage`]: providers send `content: null` for
/// tool calls and add their own fields (`reasoning_content`, `tool_calls`),
/// all of which must survive the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(default = "assistant_role")]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReplyMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: assistant_role(),
            content: Some(content.into()),
            extra: Map::new(),
        }
    }
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub message: ReplyMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Provider-specific fields (e.g. `logprobs`), relayed untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Choice {
    pub fn new(index: u32, message: ReplyMessage) -> Self {
        Self {
            index: Some(index),
            message,
            finish_reason: Some("stop".to_string()),
            extra: Map::new(),
        }
    }
}

/// An OpenAI-compatible chat completion response.
///
/// Unknown top-level fields (`id`, `object`, `created`, ...) are kept in
/// `extra` so the proxy relays the provider body in its original shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletion {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self {
            choices,
            usage: None,
            model: None,
            extra: Map::new(),
        }
    }

    /// Single-choice completion carrying one assistant reply.
    pub fn from_reply(content: impl Into<String>) -> Self {
        Self::new(vec![Choice::new(0, ReplyMessage::assistant(content))])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Text content of the first choice, if any.
    pub fn first_reply(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}
