use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;

/// Label used in diagnostics when a record has no usable `filename`.
pub(crate) const UNKNOWN_RECORD: &str = "N/A";

/// Opaque identifier of a destination dataset.
///
/// Only ever used to name a directory, so both forms render verbatim: text as
/// is and numbers exactly as [`serde_json`] prints them (`42`, `4.5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum DatasetId {
    Text(String),
    Number(Number),
}
impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}
impl From<&str> for DatasetId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl From<u64> for DatasetId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// A single entry of the routing table, as far as routing cares about it.
///
/// Everything other than these two fields is ignored (`filename` is read
/// straight from the raw value, for diagnostics only). Both are optional here
/// so a record missing one can be told apart from a malformed one.
#[derive(Debug, Deserialize)]
pub(crate) struct RouteRecord {
    #[serde(default)]
    pub service_code: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
}

/// Why a raw JSON value couldn't be used as a route.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Rejected {
    /// `service_code` or `dataset_id` is missing or `null`.
    MissingField { label: String },
    /// The value isn't an object, or one of the fields has an unusable type.
    Malformed { label: String },
}

impl RouteRecord {
    /// Interprets one element of the routing table array.
    pub(crate) fn parse(value: Value) -> Result<(String, DatasetId), Rejected> {
        let label = label_of(&value);
        if !value.is_object() {
            return Err(Rejected::Malformed { label });
        }
        let record: RouteRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(_) => return Err(Rejected::Malformed { label }),
        };
        match (record.service_code, record.dataset_id) {
            (Some(code), Some(id)) => Ok((code, id)),
            _ => Err(Rejected::MissingField { label }),
        }
    }
}

fn label_of(value: &Value) -> String {
    value.get("filename").and_then(Value::as_str).unwrap_or(UNKNOWN_RECORD).to_string()
}
