//! Document Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A document error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not a well-formed catalog document.
    #[display("malformed catalog document")]
    Malformed,
    /// The document parsed, but its key (name and version) is incomplete.
    #[display("catalog document cannot have an empty {_0}")]
    MissingKey(#[error(not(source))] &'static str),
    /// The document could not be serialized back into bytes.
    #[display("could not serialize catalog document")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A document is either valid or it's not.
        false
    }
}
