use loadreport_common::{ConvertError, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::chart::{ChartRenderer, ChartSpec, RasterBackend};
use crate::classify::summarize;
use crate::config::ConverterConfig;
use crate::reader::read_source;
use crate::report::{ReportDocument, ReportEmitter, Status};
use crate::sink::OutputSink;
use crate::stats::Statistics;

pub const EXIT_OK: i32 = 0;
/// No eligible input files.
pub const EXIT_NO_INPUT: i32 = 1;
/// Every input file failed to convert.
pub const EXIT_ALL_FAILED: i32 = 2;
/// The output directory could not be prepared.
pub const EXIT_SETUP: i32 = 3;

/// A file that made it all the way to a report.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub script_name: String,
    pub result_path: PathBuf,
    pub status: Status,
}

/// A file whose conversion stopped with an error. No report was written for it.
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: ConvertError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<FileReport>,
    pub failed: Vec<FileFailure>,
}

impl BatchOutcome {
    /// Partial success is success; only a batch with no report at all fails.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded.is_empty() {
            EXIT_ALL_FAILED
        } else {
            EXIT_OK
        }
    }
}

/// Exit code for an error that aborted the whole batch.
pub fn exit_code_for(err: &ConvertError) -> i32 {
    match err.kind() {
        ErrorKind::Discovery => EXIT_NO_INPUT,
        _ => EXIT_SETUP,
    }
}

/// List the files in `dir` with the given extension, sorted by name. Symlinks
/// count when their target is a regular file.
pub async fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let no_input = || ConvertError::NoInputFiles {
        dir: dir.to_path_buf(),
        extension: extension.to_string(),
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_input()),
        Err(e) => return Err(ConvertError::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConvertError::io(dir, e))?
    {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file());
        if is_file && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(no_input());
    }
    files.sort();
    Ok(files)
}

/// File name without its extension; names the report and the chart files.
pub fn script_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Run one file through read, classify, render and emit.
pub async fn process_file(
    path: &Path,
    renderer: &ChartRenderer,
    emitter: &ReportEmitter,
) -> Result<FileReport> {
    let script_name = script_name(path);
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let records = read_source(path).await?;
    let summary = summarize(&script_name, &file, &records)?;
    let stats = Statistics::from_durations(&summary.durations);

    let charts = renderer
        .render_all(vec![ChartSpec::histogram(&summary), ChartSpec::trend(&summary)])
        .await?;

    let doc = ReportDocument::build(&summary, &stats, &charts[0], &charts[1]);
    let result_path = emitter.emit(&script_name, &doc).await?;

    Ok(FileReport { script_name, result_path, status: doc.status })
}

/// Convert every result file in `config.results_dir`, one after another.
///
/// Returns `Err` only when the batch cannot start: no input files, or the
/// output directory cannot be created. Per-file errors are logged and
/// collected in the outcome.
pub async fn run_batch(
    config: &ConverterConfig,
    backend: Arc<dyn RasterBackend>,
) -> Result<BatchOutcome> {
    let files = discover(&config.results_dir, &config.extension).await?;

    info!(count = files.len(), dir = %config.results_dir.display(), "Found result files");
    for file in &files {
        info!(file = %file.display(), "Discovered result file");
    }

    let sink = OutputSink::create(&config.output_dir).await?;
    let renderer = ChartRenderer::new(backend, sink.clone());
    let emitter = ReportEmitter::new(sink);

    let mut outcome = BatchOutcome::default();
    for file in files {
        info!(file = %file.display(), "Processing");
        match process_file(&file, &renderer, &emitter).await {
            Ok(report) => {
                info!(
                    report = %report.result_path.display(),
                    status = ?report.status,
                    "Created report"
                );
                outcome.succeeded.push(report);
            }
            Err(error) => {
                error!(file = %file.display(), kind = ?error.kind(), %error, "Skipping file");
                outcome.failed.push(FileFailure { file, error });
            }
        }
    }

    info!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "Conversion finished"
    );
    Ok(outcome)
}
