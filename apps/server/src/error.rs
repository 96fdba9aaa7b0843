//! API error type and HTTP status mapping.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError              HTTP status                   │
//! │  ──────────────────────────────── ───────────────────────────── │
//! │  Validation(..)                   400 Bad Request               │
//! │  (missing/invalid token)          401 Unauthorized              │
//! │  InsufficientPayment              402 Payment Required          │
//! │  NoOpenSession, SessionNotFound   404 Not Found                 │
//! │  ProductNotFound, Db NotFound     404 Not Found                 │
//! │  SessionAlreadyOpen               409 Conflict                  │
//! │  InsufficientStock                409 Conflict                  │
//! │  Db UniqueViolation               409 Conflict                  │
//! │  everything else                  500 Internal Server Error     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Responses are JSON: `{"error": {"kind": "...", "message": "..."}}`.
//! The `kind` is a stable machine-readable tag; the message is for humans.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use caixa_core::{CoreError, ValidationError};
use caixa_db::DbError;

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthorized",
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            kind,
            message: message.into(),
        }
    }

    pub fn conflict(kind: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "kind": self.kind,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionAlreadyOpen => ApiError::conflict("register_already_open", err.to_string()),
            CoreError::SessionNotFound => ApiError::not_found("session_not_found", err.to_string()),
            CoreError::NoOpenSession => ApiError::not_found("no_open_session", err.to_string()),
            CoreError::ProductNotFound(_) => ApiError::not_found("product_not_found", err.to_string()),
            CoreError::InsufficientStock { .. } => ApiError::conflict("insufficient_stock", err.to_string()),
            CoreError::InsufficientPayment { .. } => ApiError {
                status: StatusCode::PAYMENT_REQUIRED,
                kind: "insufficient_payment",
                message: err.to_string(),
            },
            CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found("not_found", err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict("conflict", err.to_string()),
            other => {
                // Storage failures are logged in full; the client gets a
                // generic message without internals.
                error!(error = %other, "database error");
                ApiError::internal("internal database error")
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_statuses() {
        let err: ApiError = CoreError::SessionAlreadyOpen.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.kind, "register_already_open");

        let err: ApiError = CoreError::NoOpenSession.into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = CoreError::InsufficientPayment {
            total_cents: 10_000,
            received_cents: 9_000,
        }
        .into();
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);

        let err: ApiError = CoreError::InsufficientStock {
            code: "CAFE-500".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.kind, "insufficient_stock");
    }

    #[test]
    fn test_db_error_statuses() {
        let err: ApiError = DbError::UniqueViolation {
            field: "code".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = DbError::Internal("boom".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internals must not leak into the message
        assert!(!err.message.contains("boom"));
    }
}
