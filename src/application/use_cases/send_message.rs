use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::ProxyTransport;
use crate::domain::{ChatCompletion, ChatMessage, ClientError, TransportPolicy};

/// Client request helper: delivers a conversation to the proxy and returns
/// the assistant's reply text.
///
/// Transports are tried in the order given by the [`TransportPolicy`], with
/// its backoff between attempts. Only transport failures move on to the next
/// attempt; a malformed response is final because every transport reaches
/// the same upstream.
pub struct SendMessageUseCase {
    transports: Vec<Arc<dyn ProxyTransport>>,
    policy: TransportPolicy,
}

impl SendMessageUseCase {
    pub fn new(policy: TransportPolicy) -> Self {
        Self {
            transports: Vec::new(),
            policy,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn ProxyTransport>) -> Self {
        self.transports.push(transport);
        self
    }

    pub fn policy(&self) -> &TransportPolicy {
        &self.policy
    }

    pub(crate) fn transport_count(&self) -> usize {
        self.transports.len()
    }

    pub async fn execute(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        validate(messages)?;

        let mut last_error = None;
        for (attempt, kind) in self.policy.attempts().enumerate() {
            let Some(transport) = self.transports.iter().find(|t| t.kind() == kind) else {
                warn!("No {} transport configured, skipping", kind);
                last_error = Some(ClientError::transport(format!(
                    "no {kind} transport configured"
                )));
                continue;
            };

            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                debug!("Backing off {}ms before attempt {}", delay.as_millis(), attempt + 1);
                tokio::time::sleep(delay).await;
            }

            debug!(
                "Attempt {} via {} with {} messages",
                attempt + 1,
                kind,
                messages.len()
            );

            match transport.send(messages).await {
                Ok(completion) => {
                    let reply = extract_reply(&completion)?;
                    info!("Reply received via {} ({} chars)", kind, reply.len());
                    return Ok(reply);
                }
                Err(e) if e.is_transport() => {
                    warn!("{} transport failed: {}", kind, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::transport("no transport attempted")))
    }
}

/// Content of `choices[0].message`, unchanged.
pub fn extract_reply(completion: &ChatCompletion) -> Result<String, ClientError> {
    completion
        .first_reply()
        .map(str::to_string)
        .ok_or_else(|| ClientError::protocol("response contains no reply text"))
}

fn validate(messages: &[ChatMessage]) -> Result<(), ClientError> {
    if messages.is_empty() {
        return Err(ClientError::invalid_input("message list must not be empty"));
    }
    if let Some(i) = messages.iter().position(|m| m.content.trim().is_empty()) {
        return Err(ClientError::invalid_input(format!(
            "message {i} has empty content"
        )));
    }
    Ok(())
}
