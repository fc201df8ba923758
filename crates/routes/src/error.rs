//! Routes Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A routing table error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for routing table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Malformed *records* are never an error (they're skipped with a warning);
/// these only describe failures of the routing table as a whole.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The routing table file does not exist (or isn't a regular file).
    #[display("routing table not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Contents aren't valid JSON, or aren't a JSON array of records.
    #[display("routing table is not a valid JSON array")]
    Parse,
    /// Reading the file failed for any other reason.
    #[display("I/O error")]
    Io,
}
