use crate::error::{ErrorKind, Result};
use crate::{Job, Outcome, Transcoder};
use exn::ResultExt;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::instrument;

/// Transcodes by shelling out to `ffmpeg`.
///
/// Equivalent to running:
///
/// ```text
/// ffmpeg -i <input> -vf scale=<width>:-1 -q:v <quality> <output>
/// ```
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    program: PathBuf,
}
impl Ffmpeg {
    /// Resolves `program` through `PATH` (or uses it directly if it's a path).
    ///
    /// Never fails: when the program can't be found, a warning is logged and
    /// the bare name is kept, so each job fails individually when spawned.
    pub fn discover(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        match which::which(program) {
            Ok(path) => {
                tracing::debug!(transcoder = %path.display(), "Discovered transcoder");
                Self { program: path }
            },
            Err(_) => {
                tracing::warn!(
                    "Transcoder `{}` not found; images will fail to process until it is installed",
                    program.to_string_lossy()
                );
                Self { program: PathBuf::from(program) }
            },
        }
    }

    /// Uses `program` exactly as given, without searching `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn arguments(job: &Job<'_>) -> Vec<OsString> {
        vec![
            "-i".into(),
            job.input.as_os_str().to_owned(),
            "-vf".into(),
            format!("scale={}:-1", job.settings.scale_width).into(),
            "-q:v".into(),
            job.settings.quality.to_string().into(),
            job.output.as_os_str().to_owned(),
        ]
    }
}

impl Transcoder for Ffmpeg {
    #[instrument(skip_all, fields(input = %job.input.display(), output = %job.output.display()))]
    fn transcode(&self, job: &Job<'_>) -> Result<Outcome> {
        let output = Command::new(&self.program)
            .args(Self::arguments(job))
            // Never let ffmpeg sit waiting on an overwrite prompt.
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .or_raise(|| ErrorKind::Spawn(self.program.clone()))?;
        if output.status.success() {
            return Ok(Outcome::Success);
        }
        Ok(Outcome::Failed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
