//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{OrderError, RepositoryError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Repository error.
    Repository(RepositoryError),
    /// Order cannot move to the requested status.
    Order(OrderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Order(err) => (StatusCode::CONFLICT, err.to_string()),
            ApiError::Repository(err) => repository_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn repository_error_to_response(err: RepositoryError) -> (StatusCode, String) {
    match &err {
        RepositoryError::NotExist => (StatusCode::NOT_FOUND, err.to_string()),
        RepositoryError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
        _ => {
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
