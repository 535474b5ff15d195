use chrono::{DateTime, Utc};
use loadreport_common::{
    is_known_metric, ConvertError, Location, MetricRecord, Result, LATENCY_METRIC, POINT_TYPE,
    REQUESTS_METRIC,
};
use serde_json::Value;

/// A record after classification. Downstream code only ever sees this.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// One request duration in milliseconds. `time` is `None` for aggregated sources.
    Latency { value: f64, time: Option<DateTime<Utc>> },
    RequestCount(f64),
    FailureCount(f64),
    Ignored,
}

impl Sample {
    /// Classify one record. `index` is its 1-based position, used in errors.
    pub fn classify(file: &str, index: usize, record: &MetricRecord) -> Result<Sample> {
        if record.kind != POINT_TYPE {
            return Ok(Sample::Ignored);
        }
        if !is_known_metric(&record.metric) {
            return Ok(Sample::Ignored);
        }

        let parse_error = |message: String| ConvertError::Parse {
            file: file.to_string(),
            location: Location::Record(index),
            message,
        };
        let value = match &record.data.value {
            Some(raw) => raw.as_f64().ok_or_else(|| {
                parse_error(format!("{} point has non-numeric value {raw}", record.metric))
            })?,
            None => return Err(parse_error(format!("{} point has no value", record.metric))),
        };

        let sample = match record.metric.as_str() {
            LATENCY_METRIC => {
                let time = match &record.data.time {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(timestamp(file, index, raw)?),
                };
                Sample::Latency { value, time }
            }
            REQUESTS_METRIC => Sample::RequestCount(value),
            _ => Sample::FailureCount(value),
        };
        Ok(sample)
    }
}

/// RFC 3339 text normalized to UTC; anything else is an invalid timestamp.
fn timestamp(file: &str, index: usize, raw: &Value) -> Result<DateTime<Utc>> {
    raw.as_str()
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| ConvertError::InvalidTimestamp {
            file: file.to_string(),
            location: Location::Record(index),
            value: raw.as_str().map_or_else(|| raw.to_string(), str::to_string),
        })
}

/// Everything the report needs from one result file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub script_name: String,
    /// Source order, never sorted in place.
    pub durations: Vec<f64>,
    /// Parallel to `durations`.
    pub timestamps: Vec<Option<DateTime<Utc>>>,
    pub total_requests: f64,
    pub failed_requests: f64,
}

impl FileSummary {
    pub fn new(script_name: &str) -> Self {
        Self {
            script_name: script_name.to_string(),
            durations: Vec::new(),
            timestamps: Vec::new(),
            total_requests: 0.0,
            failed_requests: 0.0,
        }
    }

    pub fn add(&mut self, sample: Sample) {
        match sample {
            Sample::Latency { value, time } => {
                self.durations.push(value);
                self.timestamps.push(time);
            }
            // Counters may arrive pre-batched, so values are summed.
            Sample::RequestCount(value) => self.total_requests += value,
            Sample::FailureCount(value) => self.failed_requests += value,
            Sample::Ignored => {}
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed_requests > 0.0
    }
}

/// Fold `records` from `file` into a summary named `script_name`.
pub fn summarize(script_name: &str, file: &str, records: &[MetricRecord]) -> Result<FileSummary> {
    let mut summary = FileSummary::new(script_name);
    for (idx, record) in records.iter().enumerate() {
        summary.add(Sample::classify(file, idx + 1, record)?);
    }
    Ok(summary)
}
