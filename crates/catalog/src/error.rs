//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use modcat_store::error::{Error as StoreError, ErrorKind as StoreErrorKind};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller may not write to the organization. Nothing was changed.
    #[display("not authorized to write to organization {_0:?}")]
    Unauthorized(#[error(not(source))] String),
    /// The submitted document or key is not acceptable.
    #[display("invalid document")]
    Validation,
    /// The record store failed.
    #[display("record store error: {_0}")]
    Store(StoreErrorKind),
}

impl ErrorKind {
    /// Convert a store error into a catalog error, keeping the store's
    /// `Exn` frame (error tree) as a child in its own error tree.
    #[track_caller]
    pub fn store(err: StoreError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Store(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(kind) => kind.is_retryable(),
            _ => false,
        }
    }
}
