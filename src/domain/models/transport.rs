use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Body shape used between the client and the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Rest,
    #[serde(rename = "graphql")]
    GraphQl,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Rest => "rest",
            TransportKind::GraphQl => "graphql",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" | "http" => Some(TransportKind::Rest),
            "graphql" | "gql" => Some(TransportKind::GraphQl),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered list of transports to try for one exchange.
///
/// Each transport gets `tries_per_transport` attempts, and the whole sequence
/// is capped at `max_attempts`. Before the n-th retry the helper waits
/// `retry_delay * n`. The policy is a value: nothing flips it after a
/// failure, so every exchange starts again from the first entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPolicy {
    order: Vec<TransportKind>,
    tries_per_transport: usize,
    max_attempts: Option<usize>,
    retry_delay: Duration,
}

impl TransportPolicy {
    pub fn new(order: Vec<TransportKind>) -> Self {
        Self {
            order,
            tries_per_transport: 1,
            max_attempts: None,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn rest_only() -> Self {
        Self::new(vec![TransportKind::Rest])
    }

    pub fn graphql_only() -> Self {
        Self::new(vec![TransportKind::GraphQl])
    }

    /// GraphQL first, REST when GraphQL fails to transport.
    pub fn graphql_with_rest_fallback() -> Self {
        Self::new(vec![TransportKind::GraphQl, TransportKind::Rest])
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Attempts per transport before moving on; zero is treated as one.
    pub fn with_tries_per_transport(mut self, tries: usize) -> Self {
        self.tries_per_transport = tries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn max_attempts(&self) -> usize {
        let total = self.order.len() * self.tries_per_transport;
        self.max_attempts.map_or(total, |cap| cap.min(total))
    }

    pub fn order(&self) -> &[TransportKind] {
        &self.order
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Wait before attempt `attempt` (zero-based): nothing before the first,
    /// then a linearly growing backoff.
    pub fn delay_before(&self, attempt: usize) -> Duration {
        self.retry_delay.saturating_mul(attempt as u32)
    }

    /// Transports to attempt, in order, after applying the cap.
    pub fn attempts(&self) -> impl Iterator<Item = TransportKind> + '_ {
        let tries = self.tries_per_transport;
        self.order
            .iter()
            .flat_map(move |kind| std::iter::repeat(*kind).take(tries))
            .take(self.max_attempts())
    }
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self::rest_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_limits_attempts() {
        let policy = TransportPolicy::graphql_with_rest_fallback().with_max_attempts(1);
        let attempts: Vec<_> = policy.attempts().collect();
        assert_eq!(attempts, vec![TransportKind::GraphQl]);
    }

    #[test]
    fn default_is_rest_only() {
        let attempts: Vec<_> = TransportPolicy::default().attempts().collect();
        assert_eq!(attempts, vec![TransportKind::Rest]);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(TransportKind::parse("GraphQL"), Some(TransportKind::GraphQl));
        assert_eq!(TransportKind::parse(" rest "), Some(TransportKind::Rest));
        assert_eq!(TransportKind::parse("grpc"), None);
    }

    #[test]
    fn retries_repeat_each_transport_before_falling_back() {
        let policy = TransportPolicy::graphql_with_rest_fallback().with_tries_per_transport(2);
        let attempts: Vec<_> = policy.attempts().collect();
        assert_eq!(
            attempts,
            vec![
                TransportKind::GraphQl,
                TransportKind::GraphQl,
                TransportKind::Rest,
                TransportKind::Rest
            ]
        );
        assert_eq!(policy.with_max_attempts(3).attempts().count(), 3);
    }

    #[test]
    fn backoff_grows_linearly() {
        let policy = TransportPolicy::rest_only().with_retry_delay(Duration::from_millis(100));
        assert_eq!(policy.delay_before(0), Duration::ZERO);
        assert_eq!(policy.delay_before(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before(2), Duration::from_millis(200));
    }
}
