use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::domain::DomainError;

/// Error body layout, chosen by the endpoint that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFlavor {
    /// `{ "error": "..." }`
    Rest,
    /// `{ "errors": [{ "message": "..." }] }`
    GraphQl,
}

#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    flavor: ErrorFlavor,
}

impl ApiError {
    pub fn rest(error: DomainError) -> Self {
        Self {
            error,
            flavor: ErrorFlavor::Rest,
        }
    }

    pub fn graphql(error: DomainError) -> Self {
        Self {
            error,
            flavor: ErrorFlavor::GraphQl,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.error);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self.error);
        }

        let message = self.error.to_string();
        let body = match self.flavor {
            ErrorFlavor::Rest => json!({ "error": message }),
            ErrorFlavor::GraphQl => json!({ "errors": [{ "message": message }] }),
        };

        let mut response = (status, Json(body)).into_response();
        if let DomainError::MethodNotAllowed { allow, .. } = &self.error {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}
