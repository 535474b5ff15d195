use loadreport_common::{is_known_metric, ConvertError, Location, MetricRecord, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk shape of a raw result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Nothing but whitespace.
    Empty,
    /// One JSON record per line (`k6 run --out json=...`).
    Lines,
    /// A single document with pre-extracted values under `metrics.<name>.values`.
    Aggregated,
}

impl Encoding {
    /// Try the whole text as one document first; anything that is not an
    /// aggregated document is treated as line-delimited.
    pub fn detect(text: &str) -> Encoding {
        if text.trim().is_empty() {
            return Encoding::Empty;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) if map.get("metrics").is_some_and(Value::is_object) =>
            {
                Encoding::Aggregated
            }
            _ => Encoding::Lines,
        }
    }
}

/// Entries stay untyped until their metric name is known; exports carry many
/// metrics (checks, custom trends, tag sets) whose shape is never inspected.
#[derive(Deserialize)]
struct AggregatedDocument {
    metrics: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct AggregatedMetric {
    values: AggregatedValues,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AggregatedValues {
    Samples(Vec<f64>),
    Single(f64),
    /// k6 summary export: counters carry `count`, rates carry `passes`.
    Summary {
        #[serde(default)]
        count: Option<f64>,
        #[serde(default)]
        passes: Option<f64>,
    },
}

/// Read `path` and normalize its contents into a record sequence.
pub async fn read_source(path: &Path) -> Result<Vec<MetricRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConvertError::io(path, e))?;
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_source(&file, &text)
}

/// Parse the text of one result file. `file` is only used in error messages.
pub fn parse_source(file: &str, text: &str) -> Result<Vec<MetricRecord>> {
    match Encoding::detect(text) {
        Encoding::Empty => Ok(Vec::new()),
        Encoding::Lines => parse_lines(file, text),
        Encoding::Aggregated => parse_aggregated(file, text),
    }
}

fn parse_lines(file: &str, text: &str) -> Result<Vec<MetricRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str::<MetricRecord>(line).map_err(|e| ConvertError::Parse {
            file: file.to_string(),
            location: Location::Line { line: idx + 1, column: Some(e.column()) },
            message: decode_message(&e),
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_aggregated(file: &str, text: &str) -> Result<Vec<MetricRecord>> {
    let doc = serde_json::from_str::<AggregatedDocument>(text).map_err(|e| ConvertError::Parse {
        file: file.to_string(),
        location: Location::Line { line: e.line(), column: Some(e.column()) },
        message: decode_message(&e),
    })?;

    let mut records = Vec::new();
    for (metric, entry) in doc.metrics {
        if !is_known_metric(&metric) {
            continue;
        }
        let entry = AggregatedMetric::deserialize(entry).map_err(|e| ConvertError::Parse {
            file: file.to_string(),
            location: Location::Field(format!("metrics.{metric}")),
            message: e.to_string(),
        })?;
        match entry.values {
            AggregatedValues::Samples(values) => {
                records.extend(values.iter().map(|v| MetricRecord::point(&metric, *v, None)));
            }
            AggregatedValues::Single(value) => {
                records.push(MetricRecord::point(&metric, value, None));
            }
            AggregatedValues::Summary { count, passes } => {
                if let Some(total) = count.or(passes) {
                    records.push(MetricRecord::point(&metric, total, None));
                }
            }
        }
    }
    Ok(records)
}

/// serde_json appends "at line X column Y"; the location is reported separately.
fn decode_message(e: &serde_json::Error) -> String {
    let full = e.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}
