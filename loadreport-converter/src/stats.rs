/// Scalar statistics over one file's durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// `None` when there were no samples, so it can never be mistaken for a real 0 ms mean.
    pub average: Option<f64>,
    /// 0 when there were no samples.
    pub p95: f64,
}

impl Statistics {
    pub fn from_durations(durations: &[f64]) -> Self {
        Self { average: mean(durations), p95: percentile(durations, 0.95) }
    }
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sort a copy of `data` ascending and return the element at index `floor(p * n)`.
/// Returns 0 for an empty slice.
pub fn percentile(data: &[f64], p: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sorted = sorted_ascending(data);
    let idx = (p * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Ascending copy of `data`; the input keeps its order.
pub fn sorted_ascending(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}
