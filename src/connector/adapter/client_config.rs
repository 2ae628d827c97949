use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::application::{ChatSession, SendMessageUseCase};
use crate::domain::{TransportKind, TransportPolicy};

use super::{GraphQlTransport, RestTransport};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:8787";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const HELLO_QUERY: &str = "query { hello }";

/// Where and how the client reaches the proxy.
///
/// Built once and handed to the request helper; nothing about the endpoint
/// is cached anywhere else.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub rest_path: String,
    pub graphql_path: String,
    pub health_path: String,
    pub timeout: Duration,
    pub policy: TransportPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            base_url: base.trim_end_matches('/').to_string(),
            rest_path: "/api/chat".to_string(),
            graphql_path: "/graphql".to_string(),
            health_path: "/health".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            policy: TransportPolicy::default(),
        }
    }

    /// `CHAT_RELAY_URL` (default `http://localhost:8787`) and
    /// `CHAT_RELAY_TIMEOUT_MS` (default 30000).
    pub fn from_env() -> Self {
        let base = std::env::var("CHAT_RELAY_URL").unwrap_or_else(|_| DEFAULT_PROXY_URL.to_string());
        let mut config = Self::new(base);
        if let Ok(raw) = std::env::var("CHAT_RELAY_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(_) => warn!("Ignoring invalid CHAT_RELAY_TIMEOUT_MS={:?}", raw),
            }
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: TransportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_graphql_path(mut self, path: impl Into<String>) -> Self {
        self.graphql_path = path.into();
        self
    }

    pub fn with_rest_path(mut self, path: impl Into<String>) -> Self {
        self.rest_path = path.into();
        self
    }

    pub fn rest_url(&self) -> String {
        format!("{}{}", self.base_url, self.rest_path)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.base_url, self.graphql_path)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    pub(crate) fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_default()
    }

    /// Request helper wired with one transport per kind named in the policy.
    pub fn send_message_use_case(&self) -> SendMessageUseCase {
        let mut use_case = SendMessageUseCase::new(self.policy.clone());
        let mut wired = Vec::new();
        for kind in self.policy.order() {
            if wired.contains(kind) {
                continue;
            }
            wired.push(*kind);
            use_case = match kind {
                TransportKind::Rest => use_case.with_transport(Arc::new(RestTransport::new(self))),
                TransportKind::GraphQl => {
                    use_case.with_transport(Arc::new(GraphQlTransport::new(self)))
                }
            };
        }
        use_case
    }

    pub fn chat_session(&self) -> ChatSession {
        ChatSession::new(self.send_message_use_case())
    }
}

fn check_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HEALTH_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Liveness check against the proxy's health endpoint; true only on 2xx.
pub async fn check_health(config: &ClientConfig) -> bool {
    fetch_health(&check_client(), config).await
}

async fn fetch_health(client: &reqwest::Client, config: &ClientConfig) -> bool {
    match client.get(config.health_url()).send().await {
        Ok(response) => {
            debug!("Health check at {} returned {}", config.health_url(), response.status());
            response.status().is_success()
        }
        Err(e) => {
            warn!("Health check at {} failed: {}", config.health_url(), e);
            false
        }
    }
}

/// Runs `query { hello }`; true when the proxy answers with a string greeting.
async fn fetch_hello(client: &reqwest::Client, config: &ClientConfig) -> bool {
    let response = match client
        .post(config.graphql_url())
        .json(&json!({ "query": HELLO_QUERY }))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("GraphQL check at {} failed: {}", config.graphql_url(), e);
            return false;
        }
    };

    if !response.status().is_success() {
        warn!("GraphQL check at {} returned {}", config.graphql_url(), response.status());
        return false;
    }
    match response.json::<Value>().await {
        Ok(body) => body["data"]["hello"].is_string(),
        Err(e) => {
            warn!("GraphQL check at {} sent an unreadable body: {}", config.graphql_url(), e);
            false
        }
    }
}

/// Outcome of [`check_connection`], one flag per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionReport {
    pub health: bool,
    pub graphql: bool,
}

impl ConnectionReport {
    /// Connected only when both checks pass.
    pub fn is_connected(&self) -> bool {
        self.health && self.graphql
    }
}

/// Checks the health endpoint and the GraphQL `hello` query concurrently.
pub async fn check_connection(config: &ClientConfig) -> ConnectionReport {
    let client = check_client();
    let (health, graphql) = tokio::join!(
        fetch_health(&client, config),
        fetch_hello(&client, config)
    );
    info!(
        "Connection check: health {}, graphql {}",
        if health { "OK" } else { "FAIL" },
        if graphql { "OK" } else { "FAIL" }
    );
    ConnectionReport { health, graphql }
}
