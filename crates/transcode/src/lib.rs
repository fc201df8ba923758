//! Image transcoding through an external program.
//!
//! The actual resizing and JPEG encoding is delegated to a [`Transcoder`],
//! in production [`Ffmpeg`]. Each [`Job`] is one blocking invocation: input
//! file in, scaled JPEG out. There are no retries and no timeouts; a job runs
//! until the external process exits.

pub mod error;
mod ffmpeg;
#[cfg(any(test, feature = "mock"))]
mod mock;

use crate::error::Result;
pub use crate::ffmpeg::Ffmpeg;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockTranscoder, PLACEHOLDER_JPEG};
use std::path::Path;

/// Fixed per-run encoding parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Target width in pixels. Height is scaled proportionally.
    pub scale_width: u32,
    /// Quality level; for ffmpeg's JPEG encoder lower means better.
    pub quality: u8,
}
impl Default for Settings {
    fn default() -> Self {
        Self { scale_width: 1000, quality: 3 }
    }
}

/// A single transcode request.
#[derive(Clone, Copy, Debug)]
pub struct Job<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub settings: Settings,
}

/// Result of a transcoder process that actually ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Zero exit status; the output file has been written.
    Success,
    /// Non-zero exit status. `code` is `None` when the process was killed by a
    /// signal. `stderr` holds the process' trimmed diagnostic output.
    Failed { code: Option<i32>, stderr: String },
}
impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Something that can turn a source image into a scaled JPEG on disk.
pub trait Transcoder {
    /// Runs the job to completion.
    ///
    /// # Errors
    /// Only when the transcoder couldn't be run at all. A transcoder that ran
    /// and failed is reported as [`Outcome::Failed`].
    fn transcode(&self, job: &Job<'_>) -> Result<Outcome>;
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(&self, job: &Job<'_>) -> Result<Outcome> {
        (**self).transcode(job)
    }
}

impl<T: Transcoder + ?Sized> Transcoder for Box<T> {
    fn transcode(&self, job: &Job<'_>) -> Result<Outcome> {
        (**self).transcode(job)
    }
}
