use std::time::Duration;

use thiserror::Error;

/// Failures raised while handling a proxied chat request.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String, allow: &'static str },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Request timed out, please retry")]
    UpstreamTimeout(Duration),

    #[error("Upstream provider error: {status}")]
    Upstream { status: u16, detail: String },

    #[error("Upstream provider unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn method_not_allowed(method: impl Into<String>, allow: &'static str) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
            allow,
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            detail: detail.into(),
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::UpstreamTimeout(_))
    }

    /// HTTP status code the proxy answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::UpstreamTimeout(_)
            | Self::Upstream { .. }
            | Self::UpstreamUnavailable(_)
            | Self::Internal(_) => 500,
        }
    }
}

/// Failures surfaced by the client request helper.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call errored, timed out, or came back with a non-success status.
    #[error("{0}")]
    Transport(String),

    /// The response arrived but did not carry a completion choice.
    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(DomainError::validation("empty").status_code(), 400);
        assert_eq!(DomainError::not_found("/nope").status_code(), 404);
        assert_eq!(
            DomainError::method_not_allowed("GET", "POST, OPTIONS").status_code(),
            405
        );
        assert_eq!(
            DomainError::UpstreamTimeout(Duration::from_secs(15)).status_code(),
            500
        );
        assert_eq!(DomainError::upstream(502, "bad gateway").status_code(), 500);
    }

    #[test]
    fn upstream_message_includes_status() {
        let err = DomainError::upstream(429, "rate limited");
        assert_eq!(err.to_string(), "Upstream provider error: 429");
    }

    #[test]
    fn timeout_message_asks_for_retry() {
        let err = DomainError::UpstreamTimeout(Duration::from_secs(15));
        assert!(err.to_string().contains("please retry"));
    }
}
