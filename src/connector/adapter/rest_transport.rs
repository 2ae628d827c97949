use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::ProxyTransport;
use crate::domain::{ChatCompletion, ChatMessage, ClientError, TransportKind};

use super::ClientConfig;

#[derive(serde::Serialize)]
struct RestRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Posts `{messages}` to the proxy's chat endpoint and reads the relayed
/// completion from the response body.
pub struct RestTransport {
    client: reqwest::Client,
    url: String,
}

impl RestTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: config.http_client(),
            url: config.rest_url(),
        }
    }
}

#[async_trait]
impl ProxyTransport for RestTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ClientError> {
        debug!("REST request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&RestRequest { messages })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        serde_json::from_str::<ChatCompletion>(&body)
            .map_err(|e| ClientError::protocol(format!("unexpected response shape: {e}")))
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }
}

pub(crate) fn request_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::transport("request timed out, please retry")
    } else {
        ClientError::transport(format!("request failed: {e}"))
    }
}

pub(crate) fn status_error(status: u16, body: &str) -> ClientError {
    match error_message(body) {
        Some(message) => ClientError::transport(format!("HTTP {status}: {message}")),
        None => ClientError::transport(format!("HTTP {status}")),
    }
}

/// Message from either `{error}` or `{errors:[{message}]}` bodies.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    value
        .get("errors")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
