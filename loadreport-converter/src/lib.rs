pub mod batch;
pub mod chart;
pub mod classify;
pub mod config;
pub mod reader;
pub mod report;
pub mod sink;
pub mod stats;

pub use batch::{run_batch, BatchOutcome};
pub use config::ConverterConfig;
