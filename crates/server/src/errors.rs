use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::{Envelope, ErrorBody};
use service::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::handler::ApiResponse;

/// An HTTP-facing failure: the status to reply with and a client-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }

    pub fn method_not_allowed() -> Self { Self::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed") }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// `{"error": msg}` body.
    pub fn into_plain(self) -> ApiResponse {
        ApiResponse::json(self.status, &ErrorBody { error: self.message })
    }

    /// Envelope body with only `error` set.
    pub fn into_envelope(self) -> ApiResponse {
        ApiResponse::json(self.status, &Envelope::<()>::error(self.message))
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %e, kind = e.kind(), "request failed");
            return Self::internal("internal server error");
        }
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
