//! Gain extraction from evaluator log output
//!
//! The evaluator logs one line per triggered event, e.g.
//! `[hap] note:c2 s:sawtooth gain:0.42`. Only the gain is charted, so each
//! line is reduced to a single number, with 0 standing in for anything that
//! does not carry a usable value.

use bounded_vec_deque::BoundedVecDeque;
use lazy_static::lazy_static;
use regex::Regex;

/// Label the default extractor looks for
pub const DEFAULT_GAIN_LABEL: &str = "gain:";

/// Number of samples a `GainSeries` keeps by default
pub const DEFAULT_CAPACITY: usize = 256;

lazy_static! {
    static ref DEFAULT_EXTRACTOR: GainExtractor = GainExtractor::new(DEFAULT_GAIN_LABEL);
}

/// Pulls a numeric value following a fixed label out of free-form text
#[derive(Clone, Debug)]
pub struct GainExtractor {
    label: String,
    re: Regex,
}

impl GainExtractor {
    pub fn new(label: &str) -> Self {
        // Escaped label followed by a plain decimal is always a valid pattern
        let re = Regex::new(&format!(r"{}([0-9]*\.?[0-9]+)", regex::escape(label)))
            .expect("escaped label forms a valid regex");
        Self {
            label: label.to_string(),
            re,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Value after the first occurrence of the label, or 0
    pub fn extract(&self, sample: Option<&str>) -> f64 {
        let Some(text) = sample else {
            return 0.0;
        };
        self.re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn extract_all<S: AsRef<str>>(&self, samples: &[S]) -> Vec<f64> {
        samples
            .iter()
            .map(|s| self.extract(Some(s.as_ref())))
            .collect()
    }
}

impl Default for GainExtractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}

/// Parse the gain out of a log line; 0 when absent or malformed
pub fn parse_gain(sample: Option<&str>) -> f64 {
    DEFAULT_EXTRACTOR.extract(sample)
}

/// Parse every line of a batch
pub fn parse_gains<S: AsRef<str>>(samples: &[S]) -> Vec<f64> {
    DEFAULT_EXTRACTOR.extract_all(samples)
}

/// Most recent gain values, as fed to the chart
#[derive(Debug)]
pub struct GainSeries {
    values: BoundedVecDeque<f64>,
}

impl GainSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: BoundedVecDeque::new(capacity.max(1)),
        }
    }

    /// Replace the series with a fresh batch, keeping the newest values
    pub fn replace(&mut self, batch: &[f64]) {
        self.values.clear();
        for &value in batch {
            self.values.push_back(value);
        }
    }

    /// Append one value, dropping the oldest once full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.max_len()
    }

    /// Upper bound of the value axis (at least 1)
    pub fn y_max(&self) -> f64 {
        self.values.iter().copied().fold(1.0, f64::max)
    }

    /// Upper bound of the sample-index axis (at least 1)
    pub fn x_max(&self) -> usize {
        self.values.len().saturating_sub(1).max(1)
    }
}

impl Clone for GainSeries {
    fn clone(&self) -> Self {
        Self {
            values: BoundedVecDeque::from_unbounded(
                self.values.iter().copied().collect(),
                self.values.max_len(),
            ),
        }
    }
}

impl Default for GainSeries {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gain_basic() {
        assert_eq!(parse_gain(Some("gain:0.42")), 0.42);
        assert_eq!(parse_gain(Some("[hap] note:c2 gain:1.5 pan:0")), 1.5);
        assert_eq!(parse_gain(Some("gain:.25")), 0.25);
        assert_eq!(parse_gain(Some("gain:3")), 3.0);
    }

    #[test]
    fn test_parse_gain_defaults_to_zero() {
        assert_eq!(parse_gain(Some("no gain here")), 0.0);
        assert_eq!(parse_gain(None), 0.0);
        assert_eq!(parse_gain(Some("gain:NaN")), 0.0);
        assert_eq!(parse_gain(Some("gain:-0.5")), 0.0);
        assert_eq!(parse_gain(Some("")), 0.0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(parse_gain(Some("gain:0.1 gain:0.9")), 0.1);
    }

    #[test]
    fn test_custom_label() {
        let extractor = GainExtractor::new("vol=");
        assert_eq!(extractor.extract(Some("vol=0.8 gain:0.1")), 0.8);
        assert_eq!(extractor.extract(Some("gain:0.1")), 0.0);
    }

    #[test]
    fn test_parse_gains_batch() {
        assert_eq!(parse_gains(&["gain:0.5", "nothing", "gain:2"]), vec![0.5, 0.0, 2.0]);
    }

    #[test]
    fn test_series_capacity() {
        let mut series = GainSeries::new(3);
        for v in [0.1, 0.2, 0.3, 0.4] {
            series.push(v);
        }
        assert_eq!(series.values(), vec![0.2, 0.3, 0.4]);

        series.replace(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(series.values(), vec![3.0, 4.0, 5.0]);
        assert_eq!(series.latest(), Some(5.0));
        assert_eq!(series.capacity(), 3);
        assert_eq!(series.clone().values(), series.values());
    }

    #[test]
    fn test_series_axis_bounds() {
        let mut series = GainSeries::default();
        assert_eq!(series.y_max(), 1.0);
        assert_eq!(series.x_max(), 1);

        series.replace(&[0.2, 1.8, 0.4]);
        assert_eq!(series.y_max(), 1.8);
        assert_eq!(series.x_max(), 2);
    }
}
