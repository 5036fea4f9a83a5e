//! Common error types for the gallery

use thiserror::Error;

/// Common result type for gallery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remediation shown whenever a write is rejected by the store
pub const PERMISSION_DENIED_HINT: &str =
    "The album store rejected the write. Check that the gallery database file and its folder are writable by the server process.";

/// Common error types across the gallery crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested album not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store refused the write
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLITE_READONLY (8) and SQLITE_AUTH (23), plus their extended codes
            let primary = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff);
            if matches!(primary, Some(8) | Some(23)) {
                return Error::PermissionDenied(db_err.message().to_string());
            }
        }
        Error::Database(err)
    }
}

/// Failure of the insert phase of a bulk replace
///
/// The delete phase never produces this error: its failure is carried in
/// [`crate::sync::ReplaceReport::delete_phase_error`], and repeated here when
/// the insert phase fails as well. Batches committed before the failure stay
/// in the store.
#[derive(Error, Debug)]
#[error("Insert phase failed after {inserted} of {total} albums: {source}")]
pub struct ReplaceError {
    pub inserted: usize,
    pub total: usize,
    pub delete_phase_error: Option<String>,
    #[source]
    pub source: Error,
}

impl ReplaceError {
    pub fn is_permission_denied(&self) -> bool {
        self.source.is_permission_denied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_phase_message_names_progress() {
        let err = ReplaceError {
            inserted: 500,
            total: 730,
            delete_phase_error: None,
            source: Error::Internal("disk full".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("500 of 730"));
        assert!(msg.contains("disk full"));
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_permission_denied_propagates_through_replace_error() {
        let err = ReplaceError {
            inserted: 0,
            total: 3,
            delete_phase_error: Some("locked".to_string()),
            source: Error::PermissionDenied("readonly".to_string()),
        };
        assert!(err.is_permission_denied());
    }
}
