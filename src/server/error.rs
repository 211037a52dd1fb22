//! API error type and JSON error responses
//!
//! Pipeline errors arrive as `anyhow::Error` and are classified by
//! downcasting to [`JarvisError`].

use crate::error::{is_rate_limit_error, JarvisError};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message returned to the caller when the provider quota is exhausted
pub const RATE_LIMIT_MESSAGE: &str = "You've reached your daily API limit for this assistant. \
Your credits will reset in a few hours, or you can upgrade your plan for more. \
Please try again later.";

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// API error mapped onto an HTTP status
#[derive(Debug)]
pub enum ApiError {
    /// 400: unsafe session identifier or unreadable request body
    BadRequest(String),
    /// 422: message outside the accepted bounds or missing fields
    UnprocessableEntity(String),
    /// 429: provider quota exhausted
    RateLimited(String),
    /// 502: every provider credential failed for another reason
    BadGateway(String),
    /// 500: anything else
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "provider_unavailable", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<JarvisError>() {
            Some(JarvisError::InvalidSessionId(_)) => {
                tracing::warn!("Invalid session_id: {}", err);
                ApiError::BadRequest(err.to_string())
            }
            Some(JarvisError::InvalidMessage(_)) => ApiError::UnprocessableEntity(err.to_string()),
            Some(JarvisError::CapacityExceeded {
                rate_limited: false,
                ..
            }) => {
                tracing::error!("Provider unavailable: {}", err);
                ApiError::BadGateway(err.to_string())
            }
            _ if is_rate_limit_error(&err) => {
                tracing::warn!("Rate limit hit: {}", err);
                ApiError::RateLimited(RATE_LIMIT_MESSAGE.to_string())
            }
            _ => {
                tracing::error!("Error processing request: {:#}", err);
                ApiError::Internal(format!("Error processing chat: {}", err))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            ApiError::UnprocessableEntity(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: JarvisError) -> StatusCode {
        ApiError::from(anyhow::Error::from(err))
            .into_response()
            .status()
    }

    #[test]
    fn test_input_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(JarvisError::InvalidSessionId("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(JarvisError::InvalidMessage("empty".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_capacity_exceeded_mapping_depends_on_rate_limit() {
        assert_eq!(
            status_of(JarvisError::CapacityExceeded {
                attempts: 2,
                rate_limited: true,
                last_error: "429".to_string(),
            }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(JarvisError::CapacityExceeded {
                attempts: 2,
                rate_limited: false,
                last_error: "connection refused".to_string(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_untyped_rate_limit_text_is_recognised() {
        let err = anyhow::anyhow!("upstream said: Rate limit exceeded");
        assert!(matches!(ApiError::from(err), ApiError::RateLimited(_)));
    }

    #[test]
    fn test_other_errors_are_internal() {
        assert_eq!(
            status_of(JarvisError::Storage("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
