//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! None of these abort a batch on their own: per-file errors are logged and
//! tallied by [`run`](crate::run). Only [`ErrorKind::Discovery`] is fatal, and
//! that's the caller's decision.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a failure.
///
/// ### Operational Errors
/// - [`ErrorKind::Discovery`]
/// - [`ErrorKind::InvalidDataset`]
///
/// ### Dependency Errors
/// - [`ErrorKind::CreateDir`]
/// - [`ErrorKind::Probe`]
/// - [`ErrorKind::Transcode`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source directory couldn't be listed.
    #[display("could not read source directory: {}", _0.display())]
    Discovery(#[error(not(source))] PathBuf),
    /// The dataset id can't be used as a single directory name (empty, `..`,
    /// contains a separator or NUL byte).
    #[display("dataset id is not a usable directory name: {_0:?}")]
    InvalidDataset(#[error(not(source))] String),
    /// Creating the dataset directory failed.
    #[display("could not create destination directory: {}", _0.display())]
    CreateDir(#[error(not(source))] PathBuf),
    /// Checking whether a destination file already exists failed.
    #[display("could not inspect destination: {}", _0.display())]
    Probe(#[error(not(source))] PathBuf),
    /// The transcoder couldn't be started.
    #[display("transcoder could not be run")]
    Transcode,
}
