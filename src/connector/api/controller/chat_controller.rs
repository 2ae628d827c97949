use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::Json;
use serde_json::Value;
use tracing::debug;

use crate::domain::{ChatCompletion, ChatRequest, DomainError};

use super::super::{ApiError, Container};

pub const CHAT_ALLOW: &str = "POST, OPTIONS";

/// `POST /api/chat` with `{ "messages": [...] }`.
///
/// The body is validated before anything is forwarded; the provider's
/// completion is relayed as-is.
pub async fn chat(
    State(container): State<Arc<Container>>,
    body: Bytes,
) -> Result<Json<ChatCompletion>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        ApiError::rest(DomainError::validation(format!(
            "Invalid request format: body is not valid JSON ({e})"
        )))
    })?;

    let request = ChatRequest::from_messages_value(value.get("messages")).map_err(ApiError::rest)?;
    debug!("Processing REST chat request with {} messages", request.len());

    let completion = container
        .forward_use_case()
        .execute(request)
        .await
        .map_err(ApiError::rest)?;

    Ok(Json(completion))
}

pub async fn chat_method_not_allowed(method: Method) -> ApiError {
    ApiError::rest(DomainError::method_not_allowed(method.as_str(), CHAT_ALLOW))
}
