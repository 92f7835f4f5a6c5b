//! Centralized error handling.
//!
//! Provides the HTTP-facing error type for the API layer, with automatic
//! response conversion, plus the per-operation tables that translate
//! account rule violations into responses.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{AccountError, AccountErrorKind};
use crate::services::AuthError;

/// Field-keyed messages returned under `error.details`
pub type FieldErrors = BTreeMap<String, String>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad Request")]
    BadRequest(FieldErrors),

    #[error("Conflict")]
    Conflict(FieldErrors),

    #[error("Internal Server Error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<FieldErrors>,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field details safe to show the client
    pub fn details(&self) -> Option<&FieldErrors> {
        match self {
            AppError::BadRequest(details) | AppError::Conflict(details) => Some(details),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, never returned
        match &self {
            AppError::Internal(msg) => tracing::error!(error = %msg, "internal error"),
            other => tracing::warn!(status = status.as_u16(), details = ?other.details(), "request rejected"),
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
                details: match self {
                    AppError::BadRequest(details) | AppError::Conflict(details) => Some(details),
                    _ => None,
                },
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        tracing::debug!(error = %err, "authentication failed");
        AppError::Unauthorized
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn bad_request(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::BadRequest(FieldErrors::from([(field.into(), msg.into())]))
    }

    pub fn conflict(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Conflict(FieldErrors::from([(field.into(), msg.into())]))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// How one account rule violation is reported by one operation.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMapping {
    pub kind: AccountErrorKind,
    pub status: StatusCode,
    pub field: &'static str,
}

impl ErrorMapping {
    pub const fn new(kind: AccountErrorKind, status: StatusCode, field: &'static str) -> Self {
        Self {
            kind,
            status,
            field,
        }
    }
}

/// Translate a service error through an operation's mapping table.
///
/// Kinds missing from the table and every error without a kind become
/// [`AppError::Internal`].
pub fn map_account_error(table: &[ErrorMapping], err: AccountError) -> AppError {
    let mapped = err
        .kind()
        .and_then(|kind| table.iter().find(|entry| entry.kind == kind));

    match mapped {
        Some(entry) if entry.status == StatusCode::CONFLICT => {
            AppError::conflict(entry.field, entry.kind.to_string())
        }
        Some(entry) if entry.status == StatusCode::BAD_REQUEST => {
            AppError::bad_request(entry.field, entry.kind.to_string())
        }
        _ => AppError::internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[ErrorMapping] = &[
        ErrorMapping::new(AccountErrorKind::AlreadyExists, StatusCode::CONFLICT, "account"),
        ErrorMapping::new(AccountErrorKind::EmailExists, StatusCode::BAD_REQUEST, "accounts"),
    ];

    #[test]
    fn test_mapped_kinds_keep_their_field() {
        let err = map_account_error(TABLE, AccountErrorKind::AlreadyExists.into());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(
            err.details().unwrap().get("account").unwrap(),
            "account already exists"
        );

        let err = map_account_error(TABLE, AccountErrorKind::EmailExists.into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.details().unwrap().get("accounts").unwrap(),
            "email already exists"
        );
    }

    #[test]
    fn test_unmapped_errors_are_internal() {
        let err = map_account_error(TABLE, AccountErrorKind::NotRegistered.into());
        assert!(matches!(err, AppError::Internal(_)));

        let err = map_account_error(TABLE, AccountError::internal("disk on fire"));
        assert!(matches!(err, AppError::Internal(_)));
        assert!(map_account_error(&[], AccountErrorKind::AlreadyExists.into())
            .details()
            .is_none());
    }

    #[test]
    fn test_auth_errors_become_unauthorized() {
        let err = AppError::from(AuthError::MissingHeader);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::bad_request("body", "invalid format").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::internal("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
