use loadreport_common::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::FileSummary;
use crate::config::RESULT_SUFFIX;
use crate::sink::OutputSink;
use crate::stats::Statistics;

pub const HISTOGRAM_ATTACHMENT: &str = "Response time histogram";
pub const TREND_ATTACHMENT: &str = "Response time trend";
pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    fn from_failed(failed: bool) -> Self {
        if failed {
            Status::Failed
        } else {
            Status::Passed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    /// File name relative to the output directory.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// The test result document read by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub name: String,
    pub status: Status,
    pub steps: Vec<Step>,
    pub attachments: Vec<Attachment>,
    pub parameters: Vec<Parameter>,
}

impl ReportDocument {
    /// Assemble the report for one file. Only the failed-requests step can
    /// fail; the others always pass whatever their numbers say.
    pub fn build(
        summary: &FileSummary,
        stats: &Statistics,
        histogram_file: &str,
        trend_file: &str,
    ) -> Self {
        let status = Status::from_failed(summary.has_failures());
        let average = match stats.average {
            Some(avg) => format!("Average duration: {avg:.2} ms"),
            None => "Average duration: undefined ms".to_string(),
        };
        let steps = vec![
            Step {
                name: format!("Total requests: {}", summary.total_requests),
                status: Status::Passed,
            },
            Step {
                name: format!("Failed requests: {}", summary.failed_requests),
                status,
            },
            Step {
                name: average,
                status: Status::Passed,
            },
            Step {
                name: format!("p95 duration: {:.2} ms", stats.p95),
                status: Status::Passed,
            },
        ];
        let attachments = vec![
            Attachment {
                name: HISTOGRAM_ATTACHMENT.to_string(),
                mime: PNG_MIME.to_string(),
                source: histogram_file.to_string(),
            },
            Attachment {
                name: TREND_ATTACHMENT.to_string(),
                mime: PNG_MIME.to_string(),
                source: trend_file.to_string(),
            },
        ];

        Self {
            name: format!("{} performance test", summary.script_name),
            status,
            steps,
            attachments,
            parameters: Vec::new(),
        }
    }
}

pub fn result_file_name(script_name: &str) -> String {
    format!("{script_name}{RESULT_SUFFIX}")
}

/// Writes report documents into the output sink.
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    sink: OutputSink,
}

impl ReportEmitter {
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    /// Check that every attachment is already in the sink, then write
    /// `<script_name>-result.json`. Returns the written path.
    pub async fn emit(&self, script_name: &str, doc: &ReportDocument) -> Result<PathBuf> {
        for attachment in &doc.attachments {
            if !self.sink.exists(&attachment.source).await {
                return Err(ConvertError::MissingAttachment(self.sink.path_of(&attachment.source)));
            }
        }

        let name = result_file_name(script_name);
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| ConvertError::io(self.sink.path_of(&name), e.into()))?;
        self.sink.write(&name, json.as_bytes()).await
    }
}
