use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::application::ChatClient;
use crate::domain::{ChatCompletion, ChatRequest, DomainError};

/// Upstream deadline used when none is configured.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Forwards one validated conversation to the upstream provider.
///
/// Stateless: the same use case serves every request concurrently. The
/// outbound call is dropped (and therefore cancelled) once the deadline passes.
pub struct ForwardChatUseCase {
    client: Arc<dyn ChatClient>,
    timeout: Duration,
}

impl ForwardChatUseCase {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn execute(&self, request: ChatRequest) -> Result<ChatCompletion, DomainError> {
        info!(
            "Forwarding {} messages to {}",
            request.len(),
            self.client.model_name()
        );

        let start_time = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.client.complete(request.messages())).await;
        let elapsed = start_time.elapsed();

        match outcome {
            Ok(Ok(completion)) => {
                info!(
                    "Upstream answered with {} choices in {}ms",
                    completion.choices.len(),
                    elapsed.as_millis()
                );
                Ok(completion)
            }
            Ok(Err(e)) => {
                warn!("Upstream call failed after {}ms: {}", elapsed.as_millis(), e);
                Err(e)
            }
            Err(_) => {
                warn!("Upstream call timed out after {}ms", elapsed.as_millis());
                Err(DomainError::UpstreamTimeout(self.timeout))
            }
        }
    }
}
