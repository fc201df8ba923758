//! Transcode Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! A transcoder that *runs* and exits non-zero is not an error at this level;
//! that's a regular [`Outcome::Failed`](crate::Outcome::Failed).

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A transcode error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transcode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The transcoder process could not be started (missing binary, permissions).
    #[display("could not start transcoder: {}", _0.display())]
    Spawn(#[error(not(source))] PathBuf),
    /// Reading or writing a file on behalf of the transcoder failed.
    #[display("I/O error")]
    Io,
}
