//! In-process transcoder for testing.

use crate::error::{ErrorKind, Result};
use crate::{Job, Outcome, Transcoder};
use exn::ResultExt;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Bytes written as the "transcoded" image. Starts with a JPEG SOI marker,
/// which is as much validation as anything here gets.
pub const PLACEHOLDER_JPEG: &[u8] = b"\xFF\xD8\xFF\xE0photoroute";

/// A [`Transcoder`] that never spawns anything.
///
/// Successful jobs write [`PLACEHOLDER_JPEG`] to the output path, exactly like
/// a real transcoder would leave a file behind. Failures can be scripted per
/// input file name. Every job is recorded so tests can assert on calls.
#[derive(Debug, Default)]
pub struct MockTranscoder {
    failures: HashMap<String, (i32, String)>,
    fail_all: Option<(i32, String)>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job exits with `code`, printing `stderr`.
    pub fn failing(code: i32, stderr: impl Into<String>) -> Self {
        Self { fail_all: Some((code, stderr.into())), ..Self::default() }
    }

    /// Jobs whose input file is named `file_name` exit with `code`.
    pub fn fail_on(mut self, file_name: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        self.failures.insert(file_name.into(), (code, stderr.into()));
        self
    }

    /// `(input, output)` of every job received so far, in order.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        // The panic here is DELIBERATE. A poisoned lock means a test already panicked.
        self.calls.lock().expect("mock transcoder lock poisoned").clone()
    }
}

impl Transcoder for MockTranscoder {
    fn transcode(&self, job: &Job<'_>) -> Result<Outcome> {
        self.calls
            .lock()
            .expect("mock transcoder lock poisoned")
            .push((job.input.to_path_buf(), job.output.to_path_buf()));
        let name = job.input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if let Some((code, stderr)) = self.failures.get(&name).or(self.fail_all.as_ref()) {
            return Ok(Outcome::Failed { code: Some(*code), stderr: stderr.clone() });
        }
        fs::write(job.output, PLACEHOLDER_JPEG).or_raise(|| ErrorKind::Io)?;
        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use std::path::Path;

    #[test]
    fn test_success_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jpg");
        let transcoder = MockTranscoder::new();
        let job = Job { input: Path::new("in.png"), output: &output, settings: Settings::default() };
        assert_eq!(transcoder.transcode(&job).unwrap(), Outcome::Success);
        assert_eq!(fs::read(&output).unwrap(), PLACEHOLDER_JPEG);
        assert_eq!(transcoder.calls(), vec![(PathBuf::from("in.png"), output)]);
    }

    #[test]
    fn test_scripted_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jpg");
        let transcoder = MockTranscoder::new().fail_on("in.png", 234, "moov atom not found");
        let job = Job { input: Path::new("photos/in.png"), output: &output, settings: Settings::default() };
        assert_eq!(
            transcoder.transcode(&job).unwrap(),
            Outcome::Failed { code: Some(234), stderr: "moov atom not found".to_string() }
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_failing_applies_to_every_job() {
        let transcoder = MockTranscoder::failing(1, "nope");
        let job = Job { input: Path::new("a.jpg"), output: Path::new("b.jpg"), settings: Settings::default() };
        assert!(!transcoder.transcode(&job).unwrap().is_success());
    }
}
