// ⚠️ Error Types
// Fatal setup errors and per-record transform errors share one enum so the
// pipeline can decide which ones abort the run and which ones skip a record.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Schema file not found: {0}")]
    SchemaNotFound(PathBuf),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single record could not be transformed; the record is skipped.
    #[error("Cannot transform field '{field}': {reason}")]
    Transform { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn transform(field: &str, reason: impl Into<String>) -> Self {
        EtlError::Transform {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Busy/locked/I/O failures may succeed on a later attempt.
    /// Constraint violations and SQL errors never will.
    pub fn is_transient(&self) -> bool {
        match self {
            EtlError::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::SystemIoFailure
                    | rusqlite::ErrorCode::CannotOpen
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_is_not_transient() {
        let err = EtlError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("FOREIGN KEY constraint failed".to_string()),
        ));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_busy_is_transient() {
        let err = EtlError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(err.is_transient());
    }

    #[test]
    fn test_transform_error_message() {
        let err = EtlError::transform("bedrooms", "'three' is not an integer");
        assert_eq!(
            err.to_string(),
            "Cannot transform field 'bedrooms': 'three' is not an integer"
        );
    }
}
