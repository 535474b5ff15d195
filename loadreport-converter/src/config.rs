use std::path::PathBuf;

/// Where the load generator drops its raw result files.
pub const DEFAULT_RESULTS_DIR: &str = "performance-tests/results";

/// Where the dashboard picks up report documents and attachments.
pub const DEFAULT_OUTPUT_DIR: &str = "allure-results";

/// Extension (without the dot) of raw result files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Rendered chart size in pixels.
pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

pub const RESULT_SUFFIX: &str = "-result.json";
pub const HISTOGRAM_SUFFIX: &str = "-histogram.png";
pub const TREND_SUFFIX: &str = "-trend.png";

/// Converter configuration
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub results_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}
