//! Maps `DomainError` onto HTTP responses.
//!
//! Every error body has the same shape:
//!
//! ```json
//! { "code": "ROOM_FULL", "message": "Room is full" }
//! ```
//!
//! Database and internal failures are logged in full and answered with a
//! generic message.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// HTTP status for a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::UnsupportedDocument => StatusCode::UNSUPPORTED_MEDIA_TYPE,

        ErrorCode::UserNotFound
        | ErrorCode::RoomNotFound
        | ErrorCode::ClanNotFound
        | ErrorCode::QuizSessionNotFound
        | ErrorCode::QuestionNotFound => StatusCode::NOT_FOUND,

        ErrorCode::InvalidStateTransition
        | ErrorCode::RoomFull
        | ErrorCode::RoomNotJoinable
        | ErrorCode::ClanFull
        | ErrorCode::AlreadyInClan
        | ErrorCode::AlreadyAnswered
        | ErrorCode::EmailTaken
        | ErrorCode::Conflict => StatusCode::CONFLICT,

        ErrorCode::Unauthorized | ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::AIProviderError | ErrorCode::PaymentError => StatusCode::BAD_GATEWAY,

        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error returned by every route handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.code);

        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(code = %err.code, error = %err.message, "Request failed");
            "An internal error occurred".to_string()
        } else {
            if status == StatusCode::BAD_GATEWAY {
                tracing::warn!(code = %err.code, error = %err.message, "Upstream provider failed");
            }
            err.message
        };

        let retry_after = err.details.get("retry_after_secs").cloned();
        let mut response = (status, Json(ErrorResponse::new(err.code.to_string(), message))).into_response();
        if let Some(value) = retry_after.and_then(|v| HeaderValue::from_str(&v).ok()) {
            response.headers_mut().insert("retry-after", value);
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_expected_statuses() {
        assert_eq!(status_for(ErrorCode::ValidationFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorCode::RoomNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::RoomFull), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::EmailTaken), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::UnsupportedDocument), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(status_for(ErrorCode::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for(ErrorCode::AIProviderError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorCode::DatabaseError), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let response = ApiError(DomainError::database("insert room", "connection reset")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.code, "DATABASE_ERROR");
        assert!(!body.message.contains("connection reset"));
    }

    #[test]
    fn rate_limited_errors_carry_retry_after() {
        let err = DomainError::new(ErrorCode::RateLimited, "Slow down").with_detail("retry_after_secs", "120");
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "120");
    }
}
