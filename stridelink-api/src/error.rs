/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the
/// appropriate status code with a JSON body.
///
/// The mapping keeps the invite taxonomy's core distinction intact: a
/// validation failure ("your code doesn't work") never shares a status or
/// error code with an infrastructure failure ("the system is
/// unavailable").

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use stridelink_shared::invite::service::InviteError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - no valid session
    Unauthorized(String),

    /// Forbidden (403) - session identity mismatch
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - requester owns the invite
    SelfInvite(String),

    /// Gone (410) - invite passed its expiry instant
    InviteExpired(String),

    /// Gone (410) - invite usage budget fully consumed
    InviteExhausted(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503) - retryable by the caller
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "invite_expired")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::SelfInvite(msg) => write!(f, "Self invite: {}", msg),
            ApiError::InviteExpired(msg) => write!(f, "Invite expired: {}", msg),
            ApiError::InviteExhausted(msg) => write!(f, "Invite exhausted: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::SelfInvite(msg) => (StatusCode::CONFLICT, "self_invite", msg, None),
            ApiError::InviteExpired(msg) => (StatusCode::GONE, "invite_expired", msg, None),
            ApiError::InviteExhausted(msg) => (StatusCode::GONE, "invite_exhausted", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert invite domain errors to API errors
impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::NotFound => {
                ApiError::NotFound("Invite code or identifier not found".to_string())
            }
            InviteError::Expired => ApiError::InviteExpired(err.to_string()),
            InviteError::UsageExhausted => ApiError::InviteExhausted(err.to_string()),
            InviteError::SelfReferential => ApiError::SelfInvite(err.to_string()),
            InviteError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            InviteError::Unauthorized => ApiError::Forbidden(err.to_string()),
            InviteError::Conflict { .. } => ApiError::InternalError(err.to_string()),
            InviteError::Transient(_) => {
                ApiError::ServiceUnavailable("Invite store temporarily unavailable".to_string())
            }
            InviteError::Store(e) => ApiError::InternalError(format!("Invite store error: {}", e)),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Invite not found".to_string());
        assert_eq!(err.to_string(), "Not found: Invite not found");
    }

    #[test]
    fn test_validation_failures_map_to_client_errors() {
        // Each validation-category invite error maps to a 4xx family
        // variant, never to internal or unavailable
        let cases: Vec<(InviteError, &str)> = vec![
            (InviteError::NotFound, "not_found"),
            (InviteError::Expired, "invite_expired"),
            (InviteError::UsageExhausted, "invite_exhausted"),
            (InviteError::SelfReferential, "self_invite"),
            (InviteError::Unauthenticated, "unauthorized"),
            (InviteError::Unauthorized, "forbidden"),
        ];

        for (err, expected) in cases {
            let api_err = ApiError::from(err);
            let code = match &api_err {
                ApiError::NotFound(_) => "not_found",
                ApiError::InviteExpired(_) => "invite_expired",
                ApiError::InviteExhausted(_) => "invite_exhausted",
                ApiError::SelfInvite(_) => "self_invite",
                ApiError::Unauthorized(_) => "unauthorized",
                ApiError::Forbidden(_) => "forbidden",
                other => panic!("unexpected mapping: {}", other),
            };
            assert_eq!(code, expected);
        }
    }

    #[test]
    fn test_infrastructure_failures_never_look_like_validation() {
        let collision = ApiError::from(InviteError::Conflict { attempts: 5 });
        assert!(matches!(collision, ApiError::InternalError(_)));

        let outage = ApiError::from(InviteError::Transient(sqlx::Error::PoolTimedOut));
        assert!(matches!(outage, ApiError::ServiceUnavailable(_)));
    }
}
