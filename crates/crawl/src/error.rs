//! Crawl Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A crawl error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file or directory could not be read.
    #[display("could not read {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// A source file lies outside both provenance zones, so it has no
    /// canonical URL. Aborts the crawl.
    #[display("not in a models or ietf tree: {}", _0.display())]
    Classification(#[error(not(source))] PathBuf),
    /// YANG text that does not follow the statement grammar.
    #[display("syntax error on line {line}: {reason}")]
    Syntax { line: usize, reason: &'static str },
    /// A source file could not be parsed as a module.
    #[display("could not parse {}", _0.display())]
    Parse(#[error(not(source))] PathBuf),
    /// A module includes a submodule whose source was never crawled.
    #[display("no URL for submodule {_0:?}")]
    MissingUrl(#[error(not(source))] String),
    /// The catalog document could not be built.
    #[display("invalid catalog document")]
    Document,
    /// The record store failed.
    #[display("record store error")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Store)
    }
}
