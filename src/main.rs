mod cli;
mod logging;

use crate::cli::Cli;
use clap::Parser;
use photoroute_config::Config;
use photoroute_library::{Context, discover};
use photoroute_routes::RouteLookup;
use photoroute_transcode::{Ffmpeg, Settings};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()).and_then(|config| cli.apply(config)) {
        Ok(config) => config,
        Err(e) => {
            // No config means no log file; the console will have to do.
            logging::init(None, cli.verbosity());
            tracing::error!("Failed to load configuration: {e:?}");
            return ExitCode::FAILURE;
        },
    };
    logging::init(config.log_file.as_deref(), cli.verbosity());
    run(&config)
}

fn run(config: &Config) -> ExitCode {
    tracing::info!("--- Starting Image Processing Pipeline ---");

    if !config.source_dir.is_dir() {
        tracing::error!("Source directory not found: {}", config.source_dir.display());
        return ExitCode::FAILURE;
    }
    if !config.dest_base.is_dir() {
        tracing::warn!(
            "Base destination directory {} does not exist. It will be created as needed.",
            config.dest_base.display()
        );
    }

    let Ok(routes) = RouteLookup::load(&config.routes) else {
        tracing::error!("Failed to load routes lookup data. Exiting.");
        return ExitCode::FAILURE;
    };

    let images = match discover(&config.source_dir, config.extensions.as_slice()) {
        Ok(images) => images,
        Err(e) => {
            tracing::error!("{e:?}");
            return ExitCode::FAILURE;
        },
    };
    if images.is_empty() {
        tracing::info!("No image files found in {}", config.source_dir.display());
    } else {
        tracing::info!("Found {} potential image files in {}", images.len(), config.source_dir.display());
    }

    let ctx = Context {
        routes,
        dest_base: config.dest_base.clone(),
        settings: Settings { scale_width: config.transcode.scale_width, quality: config.transcode.quality },
        transcoder: Ffmpeg::discover(&config.transcode.program),
    };
    let tally = photoroute_library::run(&ctx, images);

    tracing::info!("--- Image Processing Pipeline Finished ---");
    tally.report();
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::path::Path;

    const ROUTES: &str = r#"[{"service_code":"A:1","dataset_id":"42"}]"#;

    fn config(root: &Path) -> Config {
        let source_dir = root.join("photos_for_processing");
        fs::create_dir(&source_dir).unwrap();
        let routes = root.join("routes.json");
        fs::write(&routes, ROUTES).unwrap();
        let mut config = Config {
            source_dir,
            dest_base: root.join("public/images"),
            routes,
            log_file: None,
            ..Config::default()
        };
        config.transcode.program = "photoroute-test-missing-transcoder".to_string();
        config
    }

    #[test]
    fn test_missing_source_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.source_dir = dir.path().join("missing");
        // Routes are broken too; the source check comes first either way.
        fs::write(&config.routes, "[{]").unwrap();
        assert_eq!(run(&config), ExitCode::FAILURE);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("[{]"))]
    #[case(Some(r#"{"service_code":"A:1","dataset_id":"42"}"#))]
    fn test_unusable_routes_fail(#[case] contents: Option<&str>) {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        match contents {
            Some(contents) => fs::write(&config.routes, contents).unwrap(),
            None => fs::remove_file(&config.routes).unwrap(),
        }
        assert_eq!(run(&config), ExitCode::FAILURE);
    }

    #[test]
    fn test_empty_source_directory_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        assert_eq!(run(&config), ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_destination_base_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(config.source_dir.join("B_2.png"), b"raw").unwrap();
        assert_eq!(run(&config), ExitCode::SUCCESS);
        // Nothing was routed, so nothing needed creating.
        assert!(!config.dest_base.exists());
        assert!(config.source_dir.join("B_2.png").exists());
    }

    #[test]
    fn test_missing_transcoder_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(config.source_dir.join("A_1.jpg"), b"raw").unwrap();
        assert_eq!(run(&config), ExitCode::SUCCESS);
        assert!(!config.dest_base.join("42/A_1.jpg").exists());
    }
}
