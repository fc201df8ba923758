//! Destination path selection.
//!
//! Every transcoded image lands in `<dest_base>/<dataset_id>/` as
//! `<stem>.jpg`. When that name is taken, the first free name of
//! `<stem>-alt1.jpg`, `<stem>-alt2.jpg`, ... is used instead. Existing files
//! are never overwritten.
//!
//! The free-name check and the write that follows aren't atomic; this is only
//! safe while a single process writes to the destination.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use photoroute_routes::DatasetId;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

/// Extension of every transcoded image.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Where a single source image will be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The dataset directory, which exists once the placement is prepared.
    pub directory: PathBuf,
    /// Full destination path; nothing existed there when it was chosen.
    pub path: PathBuf,
}
impl Placement {
    /// Creates the dataset directory (and parents) if needed, then picks the
    /// next available file name for `stem` inside it.
    pub fn prepare(dest_base: &Path, dataset: &DatasetId, stem: &str) -> Result<Self> {
        let directory = dataset_dir(dest_base, dataset)?;
        fs::create_dir_all(&directory).or_raise(|| ErrorKind::CreateDir(directory.clone()))?;
        let path = next_available(&directory, stem)?;
        Ok(Self { directory, path })
    }
}

/// Resolves the directory for a dataset, refusing ids that aren't exactly one
/// plain path segment (so a routing table can't write outside `dest_base`).
pub fn dataset_dir(dest_base: &Path, dataset: &DatasetId) -> Result<PathBuf> {
    let name = dataset.to_string();
    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        // Null bytes pass through Path::components() on Unix but cause
        // truncation in C-based syscalls, reject them explicitly.
        (Some(Component::Normal(segment)), None) if !segment.as_encoded_bytes().contains(&0) => {
            Ok(dest_base.join(segment))
        },
        _ => exn::bail!(ErrorKind::InvalidDataset(name)),
    }
}

/// Returns the first of `<stem>.jpg`, `<stem>-alt1.jpg`, `<stem>-alt2.jpg`, ...
/// that doesn't exist in `dir`.
///
/// Anything occupying a name counts as taken, including directories and
/// dangling symlinks.
pub fn next_available(dir: &Path, stem: &str) -> Result<PathBuf> {
    let mut alt: u64 = 0;
    loop {
        let candidate = dir.join(file_name(stem, alt));
        if !occupied(&candidate)? {
            return Ok(candidate);
        }
        alt += 1;
    }
}

fn file_name(stem: &str, alt: u64) -> String {
    match alt {
        0 => format!("{stem}.{OUTPUT_EXTENSION}"),
        n => format!("{stem}-alt{n}.{OUTPUT_EXTENSION}"),
    }
}

fn occupied(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).or_raise(|| ErrorKind::Probe(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn touch(path: &Path) {
        fs::write(path, b"existing").unwrap();
    }

    #[test]
    fn test_free_name_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo.jpg"));
    }

    #[test]
    fn test_alt_suffixes_count_up() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("foo.jpg"));
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo-alt1.jpg"));
        touch(&dir.path().join("foo-alt1.jpg"));
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo-alt2.jpg"));
    }

    #[test]
    fn test_first_gap_is_filled() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("foo.jpg"));
        touch(&dir.path().join("foo-alt2.jpg"));
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo-alt1.jpg"));
    }

    #[test]
    fn test_never_returns_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..5 {
            let path = next_available(dir.path(), "PF0000508_586").unwrap();
            assert!(!path.exists());
            touch(&path);
        }
        assert!(dir.path().join("PF0000508_586-alt4.jpg").exists());
    }

    #[test]
    fn test_directory_counts_as_taken() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("foo.jpg")).unwrap();
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo-alt1.jpg"));
    }

    #[test]
    fn test_other_stems_dont_collide() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("foo-alt1.jpg"));
        touch(&dir.path().join("foobar.jpg"));
        assert_eq!(next_available(dir.path(), "foo").unwrap(), dir.path().join("foo.jpg"));
    }

    #[rstest]
    #[case(DatasetId::from("42"), "42")]
    #[case(DatasetId::from(42), "42")]
    #[case(DatasetId::from("harbour-line"), "harbour-line")]
    fn test_dataset_dir(#[case] dataset: DatasetId, #[case] expected: &str) {
        let base = Path::new("public/images");
        assert_eq!(dataset_dir(base, &dataset).unwrap(), base.join(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("../escape")]
    #[case("a/b")]
    #[case("/etc")]
    #[case("a\0b")]
    fn test_unusable_dataset_dir(#[case] id: &str) {
        let err = dataset_dir(Path::new("public/images"), &DatasetId::from(id)).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidDataset(id.to_string()));
    }

    #[test]
    fn test_prepare_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("public/images");
        let placement = Placement::prepare(&base, &DatasetId::from("42"), "A_1").unwrap();
        assert!(base.join("42").is_dir());
        assert_eq!(placement.directory, base.join("42"));
        assert_eq!(placement.path, base.join("42/A_1.jpg"));
        // Idempotent when the directory already exists.
        touch(&placement.path);
        let again = Placement::prepare(&base, &DatasetId::from("42"), "A_1").unwrap();
        assert_eq!(again.path, base.join("42/A_1-alt1.jpg"));
    }
}
