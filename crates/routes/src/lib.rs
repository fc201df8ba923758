//! Routing table loading.
//!
//! The routing table is a JSON array of route records. Only two fields matter:
//!
//! ```json
//! [
//!     { "service_code": "PF0000508:586", "dataset_id": 42, "filename": "route-42.geojson" },
//!     { "service_code": "PF0000612:103", "dataset_id": "harbour" }
//! ]
//! ```
//!
//! `service_code` must be a string; `dataset_id` may be a string or a number
//! and is treated as an opaque directory name ([`DatasetId`]). `filename`, when
//! present, only serves to name a record in warnings. Any other field is
//! ignored.

pub mod error;
mod lookup;
mod record;

pub use crate::lookup::RouteLookup;
pub use crate::record::DatasetId;
