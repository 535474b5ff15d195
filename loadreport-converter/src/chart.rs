use chrono::{DateTime, SecondsFormat, Utc};
use loadreport_common::{ConvertError, Result};
use std::sync::Arc;

use crate::classify::FileSummary;
use crate::config::{CHART_HEIGHT, CHART_WIDTH, HISTOGRAM_SUFFIX, TREND_SUFFIX};
use crate::sink::OutputSink;
use crate::stats::sorted_ascending;

pub type Rgb = [u8; 3];

const BLUE: Rgb = [0, 0, 255];
const LIGHT_BLUE: Rgb = [173, 216, 230];
const GREEN: Rgb = [0, 128, 0];
const LIGHT_GREEN: Rgb = [144, 238, 144];
const WHITE: Rgb = [255, 255, 255];
const AXIS: Rgb = [64, 64, 64];
const GRID: Rgb = [224, 224, 224];

/// Plot area insets: left, right, top, bottom.
const MARGINS: (u32, u32, u32, u32) = (60, 20, 20, 40);
const GRID_LINES: u32 = 5;

/// Label used for a trend point whose source carried no timestamp.
pub const MISSING_TIME_LABEL: &str = "-";

/// A single-series line chart, ready to be rasterized.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_name: String,
    pub title: String,
    /// One x-axis label per value.
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub line: Rgb,
    pub fill: Rgb,
}

impl ChartSpec {
    /// Durations sorted ascending, plotted against their rank.
    pub fn histogram(summary: &FileSummary) -> Self {
        let values = sorted_ascending(&summary.durations);
        Self {
            file_name: format!("{}{HISTOGRAM_SUFFIX}", summary.script_name),
            title: "Response time (ms)".to_string(),
            labels: (0..values.len()).map(|i| i.to_string()).collect(),
            values,
            line: BLUE,
            fill: LIGHT_BLUE,
        }
    }

    /// Durations in source order, plotted against their timestamps.
    pub fn trend(summary: &FileSummary) -> Self {
        Self {
            file_name: format!("{}{TREND_SUFFIX}", summary.script_name),
            title: "Response time over time".to_string(),
            labels: summary
                .timestamps
                .iter()
                .map(|t| {
                    t.as_ref()
                        .map_or_else(|| MISSING_TIME_LABEL.to_string(), format_timestamp)
                })
                .collect(),
            values: summary.durations.clone(),
            line: GREEN,
            fill: LIGHT_GREEN,
        }
    }
}

/// UTC, millisecond precision, `Z` suffix: `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Turns a chart into encoded image bytes.
pub trait RasterBackend: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<Vec<u8>>;
}

/// Draws line charts into an RGB buffer and encodes them as PNG.
///
/// The chart's title, labels and values are stored in `Title`, `Labels` and
/// `Values` text chunks, one entry per line, in plotting order.
#[derive(Debug, Clone, Copy)]
pub struct PngBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for PngBackend {
    fn default() -> Self {
        Self { width: CHART_WIDTH, height: CHART_HEIGHT }
    }
}

impl RasterBackend for PngBackend {
    fn render(&self, chart: &ChartSpec) -> Result<Vec<u8>> {
        let render_err = |message: String| ConvertError::Render {
            chart: chart.file_name.clone(),
            message,
        };

        if let Some(idx) = chart.values.iter().position(|v| !v.is_finite()) {
            return Err(render_err(format!("non-finite value at index {idx}")));
        }
        let (left, right, top, bottom) = MARGINS;
        if self.width <= left + right + 1 || self.height <= top + bottom + 1 {
            return Err(render_err(format!("canvas {}x{} is too small", self.width, self.height)));
        }

        let mut canvas = Canvas::new(self.width, self.height);
        canvas.plot(chart);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let values: Vec<String> = chart.values.iter().map(f64::to_string).collect();
            for (keyword, text) in [
                ("Title", chart.title.clone()),
                ("Labels", chart.labels.join("\n")),
                ("Values", values.join("\n")),
            ] {
                encoder
                    .add_text_chunk(keyword.to_string(), text)
                    .map_err(|e| render_err(e.to_string()))?;
            }
            let mut writer = encoder.write_header().map_err(|e| render_err(e.to_string()))?;
            writer
                .write_image_data(&canvas.pixels)
                .map_err(|e| render_err(e.to_string()))?;
            writer.finish().map_err(|e| render_err(e.to_string()))?;
        }
        Ok(buf)
    }
}

struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let pixels = WHITE.repeat((width * height) as usize);
        Self { width, height, pixels }
    }

    fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let offset = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.pixels[offset..offset + 3].copy_from_slice(&color);
    }

    /// Bresenham.
    fn line(&mut self, (mut x0, mut y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn plot(&mut self, chart: &ChartSpec) {
        let (left, right, top, bottom) = MARGINS;
        let x_min = left as i64;
        let x_max = (self.width - right) as i64;
        let y_min = top as i64;
        let y_max = (self.height - bottom) as i64;

        for i in 0..=GRID_LINES {
            let y = y_min + (y_max - y_min) * i as i64 / GRID_LINES as i64;
            self.line((x_min, y), (x_max, y), GRID);
        }
        self.line((x_min, y_min), (x_min, y_max), AXIS);
        self.line((x_min, y_max), (x_max, y_max), AXIS);

        if chart.values.is_empty() {
            return;
        }

        let lo = chart.values.iter().copied().fold(0.0_f64, f64::min);
        let mut hi = chart.values.iter().copied().fold(f64::MIN, f64::max);
        if hi <= lo {
            hi = lo + 1.0;
        }
        let n = chart.values.len();
        let points: Vec<(i64, i64)> = chart
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = if n == 1 {
                    (x_min + x_max) / 2
                } else {
                    x_min + (x_max - x_min) * i as i64 / (n as i64 - 1)
                };
                let y = y_max - ((v - lo) / (hi - lo) * (y_max - y_min) as f64).round() as i64;
                (x, y)
            })
            .collect();

        for pair in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            for x in x0..=x1 {
                let y = if x1 == x0 { y0.min(y1) } else { y0 + (y1 - y0) * (x - x0) / (x1 - x0) };
                if y + 1 < y_max {
                    self.line((x, y + 1), (x, y_max - 1), chart.fill);
                }
            }
        }
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], chart.line);
            self.line((pair[0].0, pair[0].1 - 1), (pair[1].0, pair[1].1 - 1), chart.line);
        }
        if let [(x, y)] = points.as_slice() {
            for dx in -2..=2 {
                for dy in -2..=2 {
                    self.set(x + dx, y + dy, chart.line);
                }
            }
        }
    }
}

/// Renders charts one at a time and stores them in the output sink.
#[derive(Clone)]
pub struct ChartRenderer {
    backend: Arc<dyn RasterBackend>,
    sink: OutputSink,
}

impl ChartRenderer {
    pub fn new(backend: Arc<dyn RasterBackend>, sink: OutputSink) -> Self {
        Self { backend, sink }
    }

    /// Rasterize `chart` on the blocking pool, wait for it, and write the
    /// image. Returns the file name written.
    pub async fn render(&self, chart: ChartSpec) -> Result<String> {
        let name = chart.file_name.clone();
        let backend = Arc::clone(&self.backend);
        let bytes = tokio::task::spawn_blocking(move || backend.render(&chart))
            .await
            .map_err(|e| ConvertError::Render {
                chart: name.clone(),
                message: format!("render task failed: {e}"),
            })??;
        self.sink.write(&name, &bytes).await?;
        Ok(name)
    }

    /// Render every chart in order; each finishes before the next starts.
    pub async fn render_all(&self, charts: Vec<ChartSpec>) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(charts.len());
        for chart in charts {
            names.push(self.render(chart).await?);
        }
        Ok(names)
    }
}
