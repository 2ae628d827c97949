use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::{ChatClient, ForwardChatUseCase};
use crate::connector::adapter::{MockChatClient, OpenAiCompatClient, UpstreamSettings};

use super::graphql::{build_schema, RelaySchema};

pub struct ContainerConfig {
    pub upstream: UpstreamSettings,
    /// Answer from the in-process echo upstream instead of calling the provider.
    pub mock_upstream: bool,
}

impl ContainerConfig {
    pub fn from_env() -> Self {
        Self {
            upstream: UpstreamSettings::from_env(),
            mock_upstream: false,
        }
    }
}

/// Shared, immutable state handed to every request handler.
pub struct Container {
    chat_client: Arc<dyn ChatClient>,
    forward_use_case: Arc<ForwardChatUseCase>,
    schema: RelaySchema,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        let timeout = config.upstream.timeout;
        let chat_client: Arc<dyn ChatClient> = if config.mock_upstream {
            debug!("Using mock upstream");
            Arc::new(MockChatClient::new())
        } else {
            info!(
                "Upstream provider at {} (model {})",
                config.upstream.base_url, config.upstream.model
            );
            Arc::new(OpenAiCompatClient::new(config.upstream))
        };
        Self::with_chat_client(chat_client, timeout)
    }

    /// Build around an existing upstream client.
    pub fn with_chat_client(chat_client: Arc<dyn ChatClient>, timeout: Duration) -> Self {
        let forward_use_case =
            Arc::new(ForwardChatUseCase::new(Arc::clone(&chat_client)).with_timeout(timeout));
        let schema = build_schema(Arc::clone(&forward_use_case));
        Self {
            chat_client,
            forward_use_case,
            schema,
        }
    }

    pub fn forward_use_case(&self) -> &ForwardChatUseCase {
        &self.forward_use_case
    }

    pub fn graphql_schema(&self) -> &RelaySchema {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.chat_client.model_name()
    }

    pub fn upstream_timeout(&self) -> Duration {
        self.forward_use_case.timeout()
    }
}
