//! Source image discovery.
//!
//! Lists a single directory (no recursion) for files with an image extension,
//! compared ASCII case-insensitively so `PHOTO.JPG` and `photo.jpg` are both
//! picked up. Entries are de-duplicated by canonical path and returned sorted,
//! so two runs over the same directory always process files in the same
//! order.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// A discovered source photograph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    /// File name without its extension, e.g. `PF0000508_586`.
    pub stem: String,
}
impl SourceImage {
    /// Returns `None` if the path has no file name, or one that isn't UTF-8.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let stem = path.file_stem()?.to_str()?.to_string();
        Some(Self { path, stem })
    }

    /// Routing key derived from the file name: every `_` becomes `:`.
    ///
    /// ```
    /// # use photoroute_library::SourceImage;
    /// let image = SourceImage::new("photos/PF0000508_586.jpg").unwrap();
    /// assert_eq!(image.lookup_key(), "PF0000508:586");
    /// ```
    pub fn lookup_key(&self) -> String {
        self.stem.replace('_', ":")
    }

    /// File name for log messages.
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        self.path.file_name().unwrap_or(self.path.as_os_str()).to_string_lossy()
    }
}

/// Finds every image in `dir` whose extension is one of `extensions`.
///
/// Candidates that aren't regular files (directories, dangling symlinks) are
/// logged and left out, as are files whose names aren't valid UTF-8.
///
/// # Errors
/// [`ErrorKind::Discovery`] if the directory can't be listed.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn discover(dir: &Path, extensions: &[impl AsRef<str>]) -> Result<Vec<SourceImage>> {
    let entries = fs::read_dir(dir).or_raise(|| ErrorKind::Discovery(dir.to_path_buf()))?;
    Ok(select(dir, entries.map(|entry| entry.map(|entry| entry.path())), extensions))
}

/// Filters listed paths down to the unique image files among them. A listing
/// entry that couldn't be read is logged and skipped like any other
/// unusable candidate.
fn select(
    dir: &Path,
    paths: impl IntoIterator<Item = io::Result<PathBuf>>,
    extensions: &[impl AsRef<str>],
) -> Vec<SourceImage> {
    let mut found: BTreeMap<PathBuf, SourceImage> = BTreeMap::new();
    for path in paths {
        let path = match path {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            },
        };
        if !has_extension(&path, extensions) {
            continue;
        }
        // Follows symlinks: a link to a photo counts, a dangling one doesn't.
        if !fs::metadata(&path).is_ok_and(|m| m.is_file()) {
            tracing::warn!("Skipping non-file item: {}", path.display());
            continue;
        }
        let canonical = match fs::canonicalize(&path) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!("Skipping {}: could not resolve path: {e}", path.display());
                continue;
            },
        };
        let Some(image) = SourceImage::new(&path) else {
            tracing::warn!("Skipping {}: file name is not valid UTF-8", path.display());
            continue;
        };
        if found.contains_key(&canonical) {
            tracing::debug!(path = %path.display(), "Already discovered via another name");
            continue;
        }
        found.insert(canonical, image);
    }
    found.into_values().collect()
}

fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|candidate| candidate.as_ref().eq_ignore_ascii_case(ext)))
}
