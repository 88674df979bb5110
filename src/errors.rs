//! Unified application error type.
//! Every layer (store, core, cli, utils) returns AppError so the front end
//! can decide in one place what the user gets to see.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / encoding
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Store-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Store error: {0}")]
    Store(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid user type: {0} (expected 'tutor' or 'student')")]
    InvalidUserType(String),

    // ---------------------------
    // Attendance errors
    // ---------------------------
    #[error("'{0}' is not a valid ID. Please try again.")]
    InvalidUserId(String),

    #[error("ID {0} is not registered.")]
    UserNotFound(String),

    #[error("A user with ID {0} already exists.")]
    DuplicateUser(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Errors caused by what the person at the keyboard typed.
    /// Everything else is reported with a generic message and logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUserId(_) | AppError::UserNotFound(_) | AppError::DuplicateUser(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_is_user_facing() {
        let err = AppError::UserNotFound("888999999".into());
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "ID 888999999 is not registered.");
    }

    #[test]
    fn io_failure_is_not_user_facing() {
        let err = AppError::from(io::Error::other("disk full"));
        assert!(!err.is_user_facing());
    }
}
