//! Raw per-block extraction results.

use serde::{Deserialize, Serialize};

/// One raw result emitted by an extractor.
///
/// `timestamp` and `duration` are optional at the extractor boundary: an
/// extractor producing one feature per block may omit the timestamp and
/// the adapter stamps it with the block's time. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub timestamp: Option<f64>,
    pub duration: Option<f64>,
    pub values: Vec<f32>,
    pub label: Option<String>,
}

impl Feature {
    /// A feature carrying its own timestamp.
    pub fn at(timestamp: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// A feature with no timestamp, to be stamped by the host.
    pub fn unstamped() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.values = vec![value];
        self
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        self.values = values;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Value-based equality with a float tolerance on times and values.
    pub fn approx_eq(&self, other: &Feature, epsilon: f32) -> bool {
        let times_eq = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => (a - b).abs() <= epsilon as f64,
            _ => false,
        };

        times_eq(self.timestamp, other.timestamp)
            && times_eq(self.duration, other.duration)
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| (a - b).abs() <= epsilon)
            && self.label == other.label
    }
}
