use serde::{Deserialize, Serialize};

/// Aggregates over the samples in a window.
///
/// `count == 0` means no data; every other field is then zero too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
}

impl MetricStats {
    /// Exact count/avg/min/max plus a nearest-rank p95.
    ///
    /// p95 is the element at index `floor(0.95 * n)` of the ascending
    /// values, clamped to the last element. For the values 1..=100 that is
    /// index 95, i.e. 96.
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        values.sort_by(f64::total_cmp);
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let rank = ((count as f64) * 0.95).floor() as usize;

        Self {
            count,
            avg: sum / count as f64,
            min: values[0],
            max: values[count - 1],
            p95: values[rank.min(count - 1)],
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}
