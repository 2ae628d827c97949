use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::application::ProxyTransport;
use crate::domain::{ChatCompletion, ChatMessage, ClientError, TransportKind};

use super::rest_transport::{error_message, request_error, status_error};
use super::ClientConfig;

pub const SEND_MESSAGE_MUTATION: &str = "
  mutation sendMessage($input: ChatInput!) {
    sendMessage(input: $input) {
      choices {
        message {
          role
          content
        }
        index
        finish_reason
      }
      usage {
        prompt_tokens
        completion_tokens
        total_tokens
      }
      model
    }
  }
";

/// Sends the `sendMessage` mutation to the proxy's GraphQL endpoint.
///
/// A 200 response carrying an `errors` array is still a transport failure:
/// the proxy reports upstream problems that way.
pub struct GraphQlTransport {
    client: reqwest::Client,
    url: String,
}

impl GraphQlTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: config.http_client(),
            url: config.graphql_url(),
        }
    }
}

#[async_trait]
impl ProxyTransport for GraphQlTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ClientError> {
        debug!("GraphQL request to {}", self.url);

        let body = json!({
            "query": SEND_MESSAGE_MUTATION,
            "variables": { "input": { "messages": messages } },
        });

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }

        parse_send_message(&text)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::GraphQl
    }
}

fn parse_send_message(text: &str) -> Result<ChatCompletion, ClientError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ClientError::protocol(format!("response is not JSON: {e}")))?;

    let has_errors = value
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty());
    if has_errors {
        let message = error_message(text).unwrap_or_else(|| "GraphQL request failed".to_string());
        return Err(ClientError::transport(message));
    }

    let payload = value
        .get("data")
        .and_then(|d| d.get("sendMessage"))
        .filter(|p| !p.is_null())
        .cloned()
        .ok_or_else(|| ClientError::protocol("response has no data.sendMessage"))?;

    serde_json::from_value(payload)
        .map_err(|e| ClientError::protocol(format!("unexpected sendMessage shape: {e}")))
}
