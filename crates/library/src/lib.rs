//! Routing and placement of source photographs.
//!
//! A batch run has three steps:
//!
//! 1. [`discover`] lists the source directory for images.
//! 2. Each image's file stem becomes a lookup key (`PF0000508_586` becomes
//!    `PF0000508:586`), which the [`RouteLookup`] resolves to a dataset.
//! 3. The image is transcoded into `<dest_base>/<dataset>/<stem>.jpg`, or the
//!    first free `<stem>-altN.jpg` when that's taken (see [`Placement`]).
//!
//! [`run`] drives steps 2 and 3 for a whole batch and keeps a [`Tally`]. It
//! never stops early: unrouted images are skipped, failed ones are logged.

mod batch;
pub mod error;
mod placement;
mod scan;

pub use crate::batch::{Outcome, Tally, process_file, run};
pub use crate::placement::{OUTPUT_EXTENSION, Placement, dataset_dir, next_available};
pub use crate::scan::{SourceImage, discover};
use photoroute_routes::RouteLookup;
use photoroute_transcode::Settings;
use std::path::PathBuf;

/// Everything a batch needs, fixed for the duration of the run.
pub struct Context<T> {
    pub routes: RouteLookup,
    /// Created lazily, one dataset directory at a time.
    pub dest_base: PathBuf,
    pub settings: Settings,
    pub transcoder: T,
}
