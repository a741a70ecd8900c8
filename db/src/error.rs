//! Error taxonomy for the core.

use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Substrings that mark a driver error as a lost connection.
const CONNECTION_LOSS_MARKERS: [&str; 5] = ["closed", "reset", "broken", "eof", "timed out"];

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    Dial,
    Health,
    Query,
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeoutKind::Dial => "Connect",
            TimeoutKind::Health => "Health check",
            TimeoutKind::Query => "Query",
        })
    }
}

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Not connected to '{target}'")]
    NotConnected { target: String },

    #[error("Failed to connect to '{target}': {message}")]
    ConnectFailed { target: String, message: String },

    #[error("Connection lost: {message}")]
    ConnectionLoss { message: String },

    #[error("{kind} timed out after {after:?}")]
    Timeout { kind: TimeoutKind, after: Duration },

    #[error("Query failed: {message}")]
    QueryFailed {
        message: String,
        sqlstate: Option<String>,
    },

    #[error("Page {page} is out of range (1..={total_pages})")]
    InvalidPage { page: u64, total_pages: u64 },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Result is not editable: {reason}")]
    NotEditable { reason: String },

    #[error("Cannot generate UPDATE for column '{column}' on row {row}: no primary key values captured")]
    UnsafeEdit { column: String, row: usize },

    #[error("UPDATE of '{column}' on row {row} matched no rows; the row was changed or deleted")]
    RowNotMatched { column: String, row: usize },

    #[error("Push aborted after {applied} of {total} statements: {source}")]
    PartialPush {
        applied: usize,
        total: usize,
        source: Box<DbError>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DbError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn query_failed(message: impl Into<String>) -> Self {
        DbError::QueryFailed {
            message: message.into(),
            sqlstate: None,
        }
    }

    /// Whether this failure means the session is gone and one reconnect-retry
    /// is warranted.
    ///
    /// Server-reported errors are judged by SQLSTATE (class 08, or the 57P0x
    /// shutdown codes); driver errors without one fall back to a
    /// case-insensitive scan of the message.
    pub fn is_connection_loss(&self) -> bool {
        match self {
            DbError::ConnectionLoss { .. } | DbError::Timeout { .. } => true,
            DbError::QueryFailed {
                sqlstate: Some(code),
                ..
            } => is_connection_sqlstate(code),
            DbError::QueryFailed {
                message,
                sqlstate: None,
            } => looks_like_connection_loss(message),
            _ => false,
        }
    }
}

/// Case-insensitive scan for closed/reset/broken/EOF/timed-out signatures.
pub fn looks_like_connection_loss(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONNECTION_LOSS_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03")
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return DbError::ConnectionLoss {
                message: err.to_string(),
            };
        }

        if let Some(db_error) = err.as_db_error() {
            let mut message = db_error.message().to_string();
            if let Some(detail) = db_error.detail() {
                message.push_str(&format!(" ({})", detail));
            }
            return DbError::QueryFailed {
                message,
                sqlstate: Some(db_error.code().code().to_string()),
            };
        }

        // Keep the whole source chain: the io error underneath carries the
        // "reset"/"broken pipe" wording the classifier looks for.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        DbError::query_failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("connection closed")]
    #[case("Connection reset by peer (os error 104)")]
    #[case("Broken pipe")]
    #[case("unexpected EOF")]
    #[case("operation TIMED OUT")]
    fn test_connection_loss_signatures(#[case] message: &str) {
        assert!(DbError::query_failed(message).is_connection_loss());
    }

    #[rstest]
    fn test_engine_error_not_retried() {
        let err = DbError::QueryFailed {
            message: "column \"closed\" does not exist".into(),
            sqlstate: Some("42703".into()),
        };
        assert!(!err.is_connection_loss());
    }

    #[rstest]
    #[case("08006")]
    #[case("08003")]
    #[case("57P01")]
    fn test_connection_sqlstates(#[case] code: &str) {
        let err = DbError::QueryFailed {
            message: "terminating connection".into(),
            sqlstate: Some(code.into()),
        };
        assert!(err.is_connection_loss());
    }

    #[rstest]
    fn test_timeout_is_connection_class() {
        let err = DbError::Timeout {
            kind: TimeoutKind::Query,
            after: Duration::from_secs(30),
        };
        assert!(err.is_connection_loss());
        assert_eq!(err.to_string(), "Query timed out after 30s");
    }

    #[rstest]
    fn test_other_variants_not_connection_class() {
        assert!(!DbError::NotConnected { target: "x".into() }.is_connection_loss());
        assert!(!DbError::invalid_argument("page size must be at least 1").is_connection_loss());
        assert!(!DbError::query_failed("syntax error at or near \"FORM\"").is_connection_loss());
    }

    #[rstest]
    fn test_partial_push_message() {
        let err = DbError::PartialPush {
            applied: 1,
            total: 3,
            source: Box::new(DbError::query_failed("duplicate key")),
        };
        assert_eq!(
            err.to_string(),
            "Push aborted after 1 of 3 statements: Query failed: duplicate key"
        );
    }
}
