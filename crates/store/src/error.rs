//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use exn::ResultExt;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Could not open a connection to the database.
    #[display("could not connect to database")]
    Connect,
    #[display("database migration error")]
    Migration,
    /// Any other failure reported by the database driver.
    #[display("database error")]
    Database,
    /// The database rejected the record (for example, `data` is not JSON).
    #[display("record violates a database constraint")]
    Constraint,
    /// A record with the same key already exists.
    #[display("record already exists")]
    AlreadyExists,
    /// No record with the given key exists.
    #[display("record not found")]
    NotFound,
    /// A statement that must affect one row affected several.
    #[display("integrity error: {_0} rows affected")]
    Integrity(#[error(not(source))] u64),
    /// A key component is empty.
    #[display("invalid record key: empty {_0}")]
    InvalidKey(#[error(not(source))] &'static str),
    /// A row read back from the database is not a valid record.
    #[display("invalid record data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect | Self::Database)
    }

    /// Categorize a driver error.
    pub(crate) fn classify(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => Self::AlreadyExists,
                sqlx::error::ErrorKind::CheckViolation | sqlx::error::ErrorKind::NotNullViolation => Self::Constraint,
                // PostgreSQL: invalid_text_representation (malformed jsonb input).
                _ if db.code().as_deref() == Some("22P02") => Self::Constraint,
                _ => Self::Database,
            },
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Connect
            },
            _ => Self::Database,
        }
    }
}

/// Raise driver errors with their [`ErrorKind::classify`] category.
pub(crate) trait SqlxResultExt<T> {
    fn or_classify(self) -> Result<T>;
}

impl<T> SqlxResultExt<T> for sqlx::Result<T> {
    #[track_caller]
    fn or_classify(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let kind = ErrorKind::classify(&err);
                Err(err).or_raise(|| kind)
            },
        }
    }
}
