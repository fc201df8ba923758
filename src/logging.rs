//! Log output: the console (stderr) and, optionally, a log file that every
//! run appends to. Both receive the same events.

use crate::cli::Verbosity;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn filter(verbosity: Verbosity) -> EnvFilter {
    match verbosity {
        Verbosity::Quiet => EnvFilter::new("error"),
        Verbosity::Verbose => EnvFilter::new("debug"),
        // RUST_LOG only applies when neither flag was given.
        Verbosity::Normal => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn open(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber. Call once, as early as possible.
///
/// A log file that can't be opened isn't fatal; the run continues with
/// console output only and says so.
pub fn init(log_file: Option<&Path>, verbosity: Verbosity) {
    let (file, failed) = match log_file.map(|path| (path, open(path))) {
        Some((_, Ok(file))) => (Some(file), None),
        Some((path, Err(e))) => (None, Some((path, e))),
        None => (None, None),
    };
    let file_layer = file.map(|file| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));

    tracing_subscriber::registry()
        .with(filter(verbosity))
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    if let Some((path, e)) = failed {
        tracing::warn!("Could not open log file {}: {e}. Logging to console only.", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_processing.log");
        std::fs::write(&path, "first run\n").unwrap();
        {
            use std::io::Write;
            let mut file = open(&path).unwrap();
            file.write_all(b"second run\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first run\nsecond run\n");
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open(&dir.path().join("missing/run.log")).is_err());
    }
}
