use photoroute_library::{Context, Tally, discover, run};
use photoroute_routes::RouteLookup;
use photoroute_transcode::{MockTranscoder, Settings};
use std::fs;
use std::path::{Path, PathBuf};

const ROUTES: &str = r#"[{"service_code":"A:1","dataset_id":"42"}]"#;
const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

struct Workspace {
    _root: tempfile::TempDir,
    source: PathBuf,
    dest: PathBuf,
}
impl Workspace {
    fn new(files: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("photos_for_processing");
        let dest = root.path().join("public/images");
        fs::create_dir_all(&source).unwrap();
        for name in files {
            fs::write(source.join(name), b"raw").unwrap();
        }
        Self { _root: root, source, dest }
    }

    fn run(&self, transcoder: MockTranscoder) -> (Tally, MockTranscoder) {
        let ctx = Context {
            routes: RouteLookup::from_slice(ROUTES.as_bytes()).unwrap(),
            dest_base: self.dest.clone(),
            settings: Settings::default(),
            transcoder,
        };
        let images = discover(&self.source, &EXTENSIONS).unwrap();
        let tally = run(&ctx, images);
        (tally, ctx.transcoder)
    }
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                files.extend(files_under(&path));
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

#[test]
fn routed_image_lands_in_dataset_directory() {
    let ws = Workspace::new(&["A_1.jpg"]);
    let (tally, _) = ws.run(MockTranscoder::new());
    assert_eq!(tally.attempted, 1);
    assert_eq!(tally.skipped, 0);
    assert_eq!(files_under(&ws.dest), vec![ws.dest.join("42/A_1.jpg")]);
    assert!(ws.source.join("A_1.jpg").exists());
}

#[test]
fn unrouted_image_is_skipped_without_writes() {
    let ws = Workspace::new(&["B_2.png"]);
    let (tally, transcoder) = ws.run(MockTranscoder::new());
    assert_eq!(tally.attempted, 0);
    assert_eq!(tally.skipped, 1);
    assert!(files_under(&ws.dest).is_empty());
    assert!(transcoder.calls().is_empty());
}

#[test]
fn transcoder_failure_counts_as_attempted() {
    let ws = Workspace::new(&["A_1.jpg", "B_2.png"]);
    let (tally, transcoder) = ws.run(MockTranscoder::failing(1, "Invalid data found when processing input"));
    assert_eq!(tally, Tally { attempted: 1, skipped: 1, succeeded: 0, failed: 1, errored: 0 });
    assert_eq!(transcoder.calls().len(), 1);
    assert!(files_under(&ws.dest).is_empty());
}

#[test]
fn rerun_never_overwrites() {
    let ws = Workspace::new(&["A_1.jpg"]);
    ws.run(MockTranscoder::new());
    ws.run(MockTranscoder::new());
    let (tally, _) = ws.run(MockTranscoder::new());
    assert_eq!(tally.succeeded, 1);
    assert_eq!(
        files_under(&ws.dest),
        vec![ws.dest.join("42/A_1-alt1.jpg"), ws.dest.join("42/A_1-alt2.jpg"), ws.dest.join("42/A_1.jpg")]
    );
}

#[test]
fn uppercase_extension_processed_once() {
    let ws = Workspace::new(&["PHOTO.JPG"]);
    let (tally, _) = ws.run(MockTranscoder::new());
    assert_eq!(tally.skipped, 1);
    assert_eq!(tally.attempted, 0);
}

#[test]
fn non_image_entries_are_not_counted() {
    let ws = Workspace::new(&["A_1.jpg", "notes.txt"]);
    fs::create_dir(ws.source.join("A_1.png")).unwrap();
    let (tally, transcoder) = ws.run(MockTranscoder::new());
    assert_eq!(tally.attempted + tally.skipped, 1);
    assert_eq!(transcoder.calls().len(), 1);
}
