use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::placement::Placement;
use crate::scan::SourceImage;
use exn::ResultExt;
use photoroute_transcode::{Job, Outcome as TranscodeOutcome, Transcoder};
use std::fmt;
use tracing::instrument;

/// What happened to a single source image.
///
/// Errors aren't an outcome: [`process_file`] returns them as `Err`, and they
/// can only happen once the image has been routed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No route for the image's lookup key. Nothing was written.
    Skipped { key: String },
    /// Transcoded and written to its placement.
    Placed(Placement),
    /// The transcoder ran but exited non-zero. Whatever it left at the
    /// placement path (if anything) is left alone.
    TranscodeFailed { placement: Placement, code: Option<i32>, stderr: String },
}

/// Per-run counters.
///
/// `attempted` and `skipped` are the headline numbers: every image is either
/// routed (attempted) or not (skipped). Attempted images are further broken
/// down into `succeeded`, `failed` (transcoder exited non-zero) and `errored`
/// (anything else went wrong after routing).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: u64,
    pub skipped: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub errored: u64,
}
impl Tally {
    pub fn record(&mut self, result: &Result<Outcome>) {
        match result {
            Ok(Outcome::Skipped { .. }) => self.skipped += 1,
            Ok(Outcome::Placed(_)) => {
                self.attempted += 1;
                self.succeeded += 1;
            },
            Ok(Outcome::TranscodeFailed { .. }) => {
                self.attempted += 1;
                self.failed += 1;
            },
            Err(_) => {
                self.attempted += 1;
                self.errored += 1;
            },
        }
    }

    /// Logs the end-of-run totals.
    pub fn report(&self) {
        tracing::info!("Attempted processing for: {} images.", self.attempted);
        tracing::info!("Skipped due to lookup failure: {} images.", self.skipped);
        tracing::info!("{self}");
    }
}
impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Of {} attempted: {} succeeded, {} failed to transcode, {} failed with errors.",
            self.attempted, self.succeeded, self.failed, self.errored
        )
    }
}

/// Routes, places and transcodes a single image.
///
/// Unrouted images return [`Outcome::Skipped`] without touching the
/// filesystem or the transcoder. The source file is never moved or deleted.
///
/// # Errors
/// Any failure after the image was routed: an unusable dataset id, the
/// dataset directory can't be created, or the transcoder can't be started.
#[instrument(skip_all, fields(image = %image.name()))]
pub fn process_file<T: Transcoder>(ctx: &Context<T>, image: &SourceImage) -> Result<Outcome> {
    let key = image.lookup_key();
    let Some(dataset) = ctx.routes.get(&key) else {
        tracing::warn!(
            "Skipping {}: Could not find dataset_id for service code '{key}'.",
            image.name()
        );
        return Ok(Outcome::Skipped { key });
    };

    let placement = Placement::prepare(&ctx.dest_base, dataset, &image.stem)?;
    tracing::info!("Processing '{}' -> '{}'", image.name(), placement.path.display());

    let job = Job { input: &image.path, output: &placement.path, settings: ctx.settings };
    match ctx.transcoder.transcode(&job).or_raise(|| ErrorKind::Transcode)? {
        TranscodeOutcome::Success => {
            tracing::info!(
                "Successfully compressed and saved '{}' to '{}'",
                image.name(),
                placement.path.display()
            );
            Ok(Outcome::Placed(placement))
        },
        TranscodeOutcome::Failed { code, stderr } => {
            let status = code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string());
            tracing::error!("Transcoder failed for {}. Return code: {status}", image.name());
            tracing::error!("Transcoder stderr: {stderr}");
            Ok(Outcome::TranscodeFailed { placement, code, stderr })
        },
    }
}

/// Processes every image in order, never stopping early.
///
/// Per-file errors are logged with the file name and counted; the batch then
/// moves on to the next image.
pub fn run<T: Transcoder>(ctx: &Context<T>, images: impl IntoIterator<Item = SourceImage>) -> Tally {
    let mut tally = Tally::default();
    for image in images {
        let result = process_file(ctx, &image);
        if let Err(e) = &result {
            tracing::error!("An unexpected error occurred processing {}: {e}", image.name());
            tracing::debug!("{e:?}");
        }
        tally.record(&result);
    }
    tally
}
