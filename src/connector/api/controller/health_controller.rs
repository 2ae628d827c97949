use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::domain::DomainError;

use super::super::{ApiError, Container};

/// Liveness only: never calls the upstream.
pub async fn health(State(container): State<Arc<Container>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "model": container.model_name(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn health_method_not_allowed(method: Method) -> ApiError {
    ApiError::rest(DomainError::method_not_allowed(method.as_str(), "GET, OPTIONS"))
}
