//! Access Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An access error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for access operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The credential was rejected by the verifier (bad signature, expired,
    /// not a token at all).
    #[display("invalid credential")]
    InvalidCredential,
    /// The credential is valid but does not carry the allow-claim.
    #[display("credential has no {_0:?} claim")]
    MissingClaim(#[error(not(source))] String),
    /// The allow-claim is present but is not a string.
    #[display("credential claim {_0:?} is not a string")]
    MalformedClaim(#[error(not(source))] String),
    /// The verification key could not be loaded.
    #[display("unusable verification key")]
    Key,
    /// The configured algorithm can't be used with the configured key.
    #[display("algorithm {_0:?} does not match the verification key")]
    Algorithm(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Credentials don't get better with time (they only expire).
        false
    }
}
