use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Per-request latency samples, in milliseconds.
pub const LATENCY_METRIC: &str = "http_req_duration";
/// Request counter; each point carries the number of requests it stands for.
pub const REQUESTS_METRIC: &str = "http_reqs";
/// Failure rate; each point is 1 for a failed request and 0 otherwise.
pub const FAILED_METRIC: &str = "http_req_failed";
/// Type tag of a single observation. Other tags (`Metric` declarations) are skipped.
pub const POINT_TYPE: &str = "Point";

/// `true` for the metric names the converter aggregates; every other metric is ignored.
pub fn is_known_metric(name: &str) -> bool {
    matches!(name, LATENCY_METRIC | REQUESTS_METRIC | FAILED_METRIC)
}

/// One observation emitted by the load generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub metric: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: SampleData,
}

/// Payload of a record. Kept loosely typed so that records for metrics the
/// converter does not aggregate decode whatever their shape; types are only
/// enforced once a record is classified as a known metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    /// Absent on `Metric` declaration lines, which carry no observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// ISO-8601 timestamp. Absent for samples taken from a pre-aggregated document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
}

impl SampleData {
    /// The value, if it is present and numeric.
    pub fn number(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }
}

impl MetricRecord {
    /// Build a `Point` record.
    pub fn point(metric: &str, value: f64, time: Option<&str>) -> Self {
        Self {
            metric: metric.to_string(),
            kind: POINT_TYPE.to_string(),
            data: SampleData {
                value: Some(Value::from(value)),
                time: time.map(|t| Value::String(t.to_string())),
            },
        }
    }
}

/// Where in a source file a decode error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// 1-based line, with the 1-based column when the decoder reports one.
    Line { line: usize, column: Option<usize> },
    /// 1-based position in the normalized record sequence.
    Record(usize),
    /// Dotted path of an entry inside an aggregated document.
    Field(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line { line, column: Some(column) } => {
                write!(f, "line {line}, column {column}")
            }
            Location::Line { line, column: None } => write!(f, "line {line}"),
            Location::Record(index) => write!(f, "record {index}"),
            Location::Field(path) => write!(f, "{path}"),
        }
    }
}

/// Coarse classification of a [`ConvertError`], used by the batch summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Discovery,
    Parse,
    Render,
    Io,
}

/// Error types for conversion operations
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No input files with extension .{extension} found in {dir}")]
    NoInputFiles { dir: PathBuf, extension: String },

    #[error("Failed to parse {file} at {location}: {message}")]
    Parse { file: String, location: Location, message: String },

    #[error("Invalid timestamp {value:?} in {file} at {location}")]
    InvalidTimestamp { file: String, location: Location, value: String },

    #[error("Failed to render {chart}: {message}")]
    Render { chart: String, message: String },

    #[error("Report references missing attachment {0}")]
    MissingAttachment(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io { path: path.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::NoInputFiles { .. } => ErrorKind::Discovery,
            ConvertError::Parse { .. } | ConvertError::InvalidTimestamp { .. } => {
                ErrorKind::Parse
            }
            ConvertError::Render { .. } | ConvertError::MissingAttachment(_) => {
                ErrorKind::Render
            }
            ConvertError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
