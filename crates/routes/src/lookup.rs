use crate::error::{ErrorKind, Result};
use crate::record::{DatasetId, Rejected, RouteRecord};
use exn::ResultExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::instrument;

/// Immutable mapping from service code to destination dataset.
///
/// Built once per run by [`load`](RouteLookup::load) (or [`from_records`](RouteLookup::from_records)),
/// then only read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteLookup {
    routes: HashMap<String, DatasetId>,
}

impl RouteLookup {
    /// Reads and parses the routing table at `path`.
    ///
    /// Every failure is logged here before being returned, so callers only
    /// need to decide whether to carry on.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load_inner(path) {
            Ok(lookup) => {
                tracing::info!("Successfully loaded {} entries from {}", lookup.len(), path.display());
                Ok(lookup)
            },
            Err(e) => {
                match &*e {
                    ErrorKind::NotFound(_) => tracing::error!("Lookup file not found: {}", path.display()),
                    ErrorKind::Parse => tracing::error!("Error decoding JSON from {}", path.display()),
                    ErrorKind::Io => {
                        tracing::error!("An unexpected error occurred loading {}: {e:?}", path.display())
                    },
                }
                Err(e)
            },
        }
    }

    fn load_inner(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let contents = fs::read(path).or_raise(|| ErrorKind::Io)?;
        Self::from_slice(&contents)
    }

    /// Parses a routing table from raw JSON bytes. The top level must be an array.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_slice(json).or_raise(|| ErrorKind::Parse)?;
        Ok(Self::from_records(records))
    }

    /// Builds the mapping from already-parsed records.
    ///
    /// Records missing `service_code` or `dataset_id` (or that aren't usable
    /// at all) are skipped with a warning. A service code seen twice maps to
    /// the dataset of its last occurrence.
    pub fn from_records(records: impl IntoIterator<Item = Value>) -> Self {
        let mut routes = HashMap::new();
        for value in records {
            match RouteRecord::parse(value) {
                Ok((code, dataset)) => {
                    if let Some(previous) = routes.insert(code, dataset) {
                        tracing::debug!(%previous, "Duplicate service code; later entry wins");
                    }
                },
                Err(Rejected::MissingField { label }) => {
                    tracing::warn!("Skipping route entry missing 'service_code' or 'dataset_id': {label}")
                },
                Err(Rejected::Malformed { label }) => {
                    tracing::warn!("Skipping malformed route entry: {label}")
                },
            }
        }
        Self { routes }
    }

    /// Resolves a lookup key to its dataset, if routed.
    pub fn get(&self, service_code: &str) -> Option<&DatasetId> {
        self.routes.get(service_code)
    }

    pub fn contains(&self, service_code: &str) -> bool {
        self.routes.contains_key(service_code)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<(String, DatasetId)> for RouteLookup {
    fn from_iter<T: IntoIterator<Item = (String, DatasetId)>>(iter: T) -> Self {
        Self { routes: iter.into_iter().collect() }
    }
}
