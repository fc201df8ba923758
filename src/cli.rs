use clap::Parser;
use photoroute_config::Config;
use photoroute_config::error::Result as ConfigResult;
use std::path::PathBuf;

/// Resize source photographs and file them into per-dataset directories.
///
/// Each image's file name (underscores read as colons) is looked up as a
/// service code in the routing table. Routed images are transcoded into
/// `<dest>/<dataset_id>/`; unrouted ones are skipped and left in place.
#[derive(Debug, Parser)]
#[command(name = "photoroute", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to `photoroute.toml`
    /// in the working directory, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Directory containing the source photographs.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
    /// Base directory for the per-dataset output directories.
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
    /// JSON routing table of service codes and dataset ids.
    #[arg(long, value_name = "FILE")]
    pub routes: Option<PathBuf>,
    /// Output width in pixels (height keeps the aspect ratio).
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,
    /// JPEG quality, 1 (best) to 31 (worst).
    #[arg(long, value_name = "LEVEL")]
    pub quality: Option<u8>,
    /// Transcoder executable.
    #[arg(long, value_name = "PROGRAM")]
    pub transcoder: Option<String>,
    /// Append logs to this file as well as the console.
    #[arg(long, value_name = "FILE", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,
    /// Only log to the console.
    #[arg(long)]
    pub no_log_file: bool,
    /// Include debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        match (self.quiet, self.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    /// Overlays command-line flags on the loaded configuration, then
    /// re-validates it.
    pub fn apply(&self, mut config: Config) -> ConfigResult<Config> {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(dest) = &self.dest {
            config.dest_base = dest.clone();
        }
        if let Some(routes) = &self.routes {
            config.routes = routes.clone();
        }
        if let Some(width) = self.width {
            config.transcode.scale_width = width;
        }
        if let Some(quality) = self.quality {
            config.transcode.quality = quality;
        }
        if let Some(program) = &self.transcoder {
            config.transcode.program = program.clone();
        }
        if self.no_log_file {
            config.log_file = None;
        } else if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        config.validate()
    }
}
