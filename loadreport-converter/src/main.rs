use clap::Parser;
use loadreport_converter::batch::{exit_code_for, run_batch};
use loadreport_converter::chart::PngBackend;
use loadreport_converter::config::{DEFAULT_EXTENSION, DEFAULT_OUTPUT_DIR, DEFAULT_RESULTS_DIR};
use loadreport_converter::ConverterConfig;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "loadreport", about = "Convert k6 result files into dashboard test reports")]
struct Args {
    /// Directory holding the raw k6 result files
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// Directory the reports and charts are written to (created if missing)
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Extension of raw result files, without the dot
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadreport=info,loadreport_converter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ConverterConfig {
        results_dir: args.results_dir,
        output_dir: args.output_dir,
        extension: args.extension,
    };

    let outcome = match run_batch(&config, Arc::new(PngBackend::default())).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Nothing converted");
            process::exit(exit_code_for(&e));
        }
    };

    if outcome.succeeded.is_empty() {
        tracing::error!(failed = outcome.failed.len(), "Every result file failed to convert");
    }
    process::exit(outcome.exit_code());
}
