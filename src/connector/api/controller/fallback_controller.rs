use axum::http::Uri;

use crate::domain::DomainError;

use super::super::ApiError;

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::rest(DomainError::not_found(uri.path()))
}
