use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::{ChatCompletion, ChatMessage, DomainError};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection and sampling settings for the upstream provider.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl UpstreamSettings {
    /// Read settings from the environment, falling back to defaults:
    ///
    /// | Variable                | Default                    |
    /// |-------------------------|----------------------------|
    /// | `UPSTREAM_API_KEY`      | `DEEPSEEK_API_KEY`, or ""  |
    /// | `UPSTREAM_BASE_URL`     | `https://api.deepseek.com` |
    /// | `UPSTREAM_MODEL`        | `deepseek-chat`            |
    /// | `UPSTREAM_MAX_TOKENS`   | `1000`                     |
    /// | `UPSTREAM_TEMPERATURE`  | `0.7`                      |
    /// | `UPSTREAM_TIMEOUT_SECS` | `15`                       |
    ///
    /// Unparseable numbers are logged and replaced by the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = std::env::var("UPSTREAM_API_KEY")
            .or_else(|_| std::env::var("DEEPSEEK_API_KEY"))
            .unwrap_or_default();
        if api_key.is_empty() {
            warn!("No upstream API key configured (UPSTREAM_API_KEY / DEEPSEEK_API_KEY)");
        }

        Self {
            api_key,
            base_url: std::env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("UPSTREAM_MODEL").unwrap_or(defaults.model),
            max_tokens: env_number("UPSTREAM_MAX_TOKENS", defaults.max_tokens),
            temperature: env_number("UPSTREAM_TEMPERATURE", defaults.temperature),
            timeout: Duration::from_secs(env_number("UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
        }
    }
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

/// HTTP client for OpenAI-compatible chat-completions APIs (DeepSeek by default).
///
/// Authenticates with `Authorization: Bearer <key>` and always requests a
/// non-streaming completion.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiCompatClient {
    pub fn new(settings: UpstreamSettings) -> Self {
        let url = format!(
            "{}{}",
            settings.base_url.trim_end_matches('/'),
            COMPLETIONS_PATH
        );
        Self {
            client: reqwest::Client::builder()
                .timeout(settings.timeout)
                .build()
                .unwrap_or_default(),
            api_key: settings.api_key,
            model: settings.model,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout,
            url,
        }
    }

    pub fn from_env() -> Self {
        Self::new(UpstreamSettings::from_env())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        debug!("POST {} ({} messages)", self.url, messages.len());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::UpstreamTimeout(self.timeout)
                } else {
                    DomainError::unavailable(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Upstream returned {status}: {body}");
            return Err(DomainError::upstream(status.as_u16(), body));
        }

        response.json::<ChatCompletion>().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::UpstreamTimeout(self.timeout)
            } else {
                DomainError::internal(format!("failed to parse upstream response: {e}"))
            }
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_completions_url_without_double_slash() {
        let client = OpenAiCompatClient::new(UpstreamSettings {
            base_url: "https://example.test/".to_string(),
            ..UpstreamSettings::default()
        });
        assert_eq!(client.url(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn request_body_matches_provider_contract() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ApiRequest {
            model: "deepseek-chat",
            messages: &messages,
            max_tokens: 1000,
            temperature: 0.5,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 1000,
                "temperature": 0.5,
                "stream": false
            })
        );
    }

    #[test]
    fn defaults_match_provider_settings() {
        let settings = UpstreamSettings::default();
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.max_tokens, 1000);
        assert_eq!(settings.timeout, Duration::from_secs(15));
    }
}
