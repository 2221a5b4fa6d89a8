use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a load or report step.
///
/// Row-level problems (wrong column count, bad integers, empty fields) are not
/// errors: the loaders log and skip those rows.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A CSV file could not be opened or created.
    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The input file has no header record at all.
    #[error("Missing header row in {0}")]
    MissingHeader(PathBuf),

    /// The header record is not the one the loader expects.
    #[error("Incorrect headers: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_header() {
        let err = ReportError::MissingHeader(PathBuf::from("/data/users.csv"));
        assert_eq!(err.to_string(), "Missing header row in /data/users.csv");
    }

    #[test]
    fn test_error_display_header_mismatch() {
        let err = ReportError::HeaderMismatch {
            expected: vec!["firstName".to_string(), "lastName".to_string()],
            found: vec!["first".to_string(), "last".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Incorrect headers"));
        assert!(msg.contains("\"firstName\""));
        assert!(msg.contains("\"first\""));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_sqlite() {
        let err: ReportError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.to_string().starts_with("Database error"));
    }
}
