use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::Json;
use serde_json::{json, Value};

use crate::connector::api::graphql::{self, GraphQlRequest};
use crate::domain::DomainError;

use super::super::{ApiError, Container};

pub const GRAPHQL_ALLOW: &str = "POST, OPTIONS";

/// `POST /graphql` with `{ query, variables, operationName }`.
pub async fn graphql(
    State(container): State<Arc<Container>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: GraphQlRequest = serde_json::from_slice(&body).map_err(|e| {
        ApiError::graphql(DomainError::validation(format!(
            "Body must be a JSON object with a query ({e})"
        )))
    })?;

    let data = graphql::execute(container.graphql_schema(), request)
        .await
        .map_err(ApiError::graphql)?;

    Ok(Json(json!({ "data": data })))
}

pub async fn graphql_method_not_allowed(method: Method) -> ApiError {
    ApiError::graphql(DomainError::method_not_allowed(method.as_str(), GRAPHQL_ALLOW))
}
