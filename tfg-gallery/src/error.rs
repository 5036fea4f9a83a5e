//! Error types for tfg-gallery HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tfg_common::csv_import::CsvImportError;
use tfg_common::error::PERMISSION_DENIED_HINT;
use tfg_common::gate::GateError;
use tfg_common::ReplaceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - a bulk replace is already running
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No session, or the required gate is still locked (401)
    #[error("Locked: {0}")]
    Locked(String),

    /// Password attempt or session lookup failed (401)
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Uploaded file rejected before any write
    #[error(transparent)]
    Import(#[from] CsvImportError),

    /// Bulk replace stopped in its insert phase
    #[error(transparent)]
    Replace(#[from] ReplaceError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// tfg-common error
    #[error("{0}")]
    Common(#[from] tfg_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Locked(msg) => (StatusCode::UNAUTHORIZED, "LOCKED", msg),
            ApiError::Gate(ref err) => {
                let code = match err {
                    GateError::WrongPassword { .. } => "WRONG_PASSWORD",
                    GateError::UnknownSession => "UNKNOWN_SESSION",
                };
                (StatusCode::UNAUTHORIZED, code, err.to_string())
            }
            ApiError::Import(ref err) => (StatusCode::BAD_REQUEST, "IMPORT_REJECTED", err.to_string()),
            ApiError::Replace(ref err) => {
                if err.is_permission_denied() {
                    (
                        StatusCode::FORBIDDEN,
                        "PERMISSION_DENIED",
                        format!("{} {}", err, PERMISSION_DENIED_HINT),
                    )
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INSERT_PHASE_FAILED", err.to_string())
                }
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => common_error_parts(err),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn common_error_parts(err: &tfg_common::Error) -> (StatusCode, &'static str, String) {
    use tfg_common::Error;

    match err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
        e if e.is_permission_denied() => (
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            format!("{} {}", err, PERMISSION_DENIED_HINT),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", err.to_string()),
    }
}

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(tfg_common::Error::NotFound("x".into())), StatusCode::NOT_FOUND),
            (
                ApiError::from(tfg_common::Error::InvalidInput("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(tfg_common::Error::PermissionDenied("x".into())),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::from(CsvImportError::NoRecords), StatusCode::BAD_REQUEST),
            (ApiError::from(GateError::UnknownSession), StatusCode::UNAUTHORIZED),
            (ApiError::Locked("site".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Conflict("busy".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_replace_error_permission_denied_is_forbidden() {
        let err = ReplaceError {
            inserted: 2,
            total: 5,
            delete_phase_error: None,
            source: tfg_common::Error::PermissionDenied("readonly".into()),
        };
        assert_eq!(ApiError::from(err).into_response().status(), StatusCode::FORBIDDEN);
    }
}
