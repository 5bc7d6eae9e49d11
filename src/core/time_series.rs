//! TimeSeries data structure for irregularly sampled observations.

use crate::error::{PeriodogramError, Result};
use crate::utils::stats;

/// Relative tolerance on gap spread for a series to count as equidistant.
const EQUIDISTANT_TOLERANCE: f64 = 1e-6;

/// An irregularly sampled scalar time series with optional weights.
///
/// Times need not be sorted or equidistant; only their differences matter.
/// Weights are interpreted as `1/σ²` of each observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
    weights: Option<Vec<f64>>,
    span: f64,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    times: Vec<f64>,
    values: Vec<f64>,
    weights: Option<Vec<f64>>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn times(mut self, times: Vec<f64>) -> Self {
        self.times = times;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Set per-point weights (`1/σ²`).
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set per-point weights from measurement errors σ.
    pub fn errors(mut self, errors: &[f64]) -> Self {
        self.weights = Some(errors.iter().map(|e| 1.0 / (e * e)).collect());
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        TimeSeries::from_parts(self.times, self.values, self.weights)
    }
}

impl TimeSeries {
    /// Create an unweighted series.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::from_parts(times, values, None)
    }

    /// Create a weighted series; weights must be strictly positive.
    pub fn weighted(times: Vec<f64>, values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        Self::from_parts(times, values, Some(weights))
    }

    pub fn builder() -> TimeSeriesBuilder {
        TimeSeriesBuilder::new()
    }

    fn from_parts(times: Vec<f64>, values: Vec<f64>, weights: Option<Vec<f64>>) -> Result<Self> {
        if times.len() < 2 {
            return Err(PeriodogramError::InsufficientData {
                needed: 2,
                got: times.len(),
            });
        }
        if values.len() != times.len() {
            return Err(PeriodogramError::DimensionMismatch {
                expected: times.len(),
                got: values.len(),
            });
        }
        if times.iter().chain(values.iter()).any(|x| !x.is_finite()) {
            return Err(PeriodogramError::InvalidParameter(
                "times and values must be finite".to_string(),
            ));
        }
        if let Some(w) = &weights {
            if w.len() != times.len() {
                return Err(PeriodogramError::DimensionMismatch {
                    expected: times.len(),
                    got: w.len(),
                });
            }
            if w.iter().any(|x| !x.is_finite() || *x <= 0.0) {
                return Err(PeriodogramError::InvalidParameter(
                    "weights must be finite and strictly positive".to_string(),
                ));
            }
        }

        let t_min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let t_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = t_max - t_min;
        if span <= 0.0 {
            return Err(PeriodogramError::DegenerateInput(
                "time span must be positive".to_string(),
            ));
        }

        Ok(Self {
            times,
            values,
            weights,
            span,
        })
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: a valid series holds at least two points.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    /// Total time baseline `T = max(t) − min(t)`.
    pub fn span(&self) -> f64 {
        self.span
    }

    pub fn mean(&self) -> f64 {
        stats::mean(&self.values)
    }

    /// Weighted mean, or the plain mean for an unweighted series.
    pub fn weighted_mean(&self) -> f64 {
        match &self.weights {
            Some(w) => stats::weighted_mean(&self.values, w),
            None => self.mean(),
        }
    }

    /// Population variance of the values.
    pub fn variance(&self) -> f64 {
        stats::population_variance(&self.values)
    }

    /// Weighted population variance, or the plain one for an unweighted series.
    pub fn weighted_variance(&self) -> f64 {
        match &self.weights {
            Some(w) => stats::weighted_variance(&self.values, w),
            None => self.variance(),
        }
    }

    /// Median of the positive gaps between consecutive sorted times.
    ///
    /// Duplicate timestamps are ignored. Returns `None` when no positive gap exists.
    pub fn median_interval(&self) -> Option<f64> {
        let gaps = self.sorted_gaps();
        if gaps.is_empty() {
            None
        } else {
            Some(stats::median(&gaps))
        }
    }

    /// The sampling step if the series is equidistant in its given order.
    pub fn sampling_interval(&self) -> Option<f64> {
        let diffs: Vec<f64> = self.times.windows(2).map(|w| w[1] - w[0]).collect();
        let step = stats::mean(&diffs);
        if step <= 0.0 {
            return None;
        }
        let spread = diffs
            .iter()
            .map(|d| (d - step).abs())
            .fold(0.0_f64, f64::max);
        if spread <= EQUIDISTANT_TOLERANCE * step {
            Some(step)
        } else {
            None
        }
    }

    /// A copy with the plain mean removed from the values.
    pub fn centered(&self) -> Self {
        self.shifted(self.mean())
    }

    /// A copy with the weighted mean removed, as the weighted Scargle periodogram expects.
    pub fn weighted_centered(&self) -> Self {
        self.shifted(self.weighted_mean())
    }

    /// A copy with values multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        out.values.iter_mut().for_each(|v| *v *= factor);
        out
    }

    fn shifted(&self, offset: f64) -> Self {
        let mut out = self.clone();
        out.values.iter_mut().for_each(|v| *v -= offset);
        out
    }

    fn sorted_gaps(&self) -> Vec<f64> {
        let mut sorted = self.times.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn builds_valid_series() {
        let ts = TimeSeries::new(vec![0.0, 1.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.len(), 3);
        assert!(!ts.is_weighted());
        assert_relative_eq!(ts.span(), 3.0);
        assert_relative_eq!(ts.mean(), 2.0);
    }

    #[test]
    fn rejects_too_few_points() {
        let err = TimeSeries::new(vec![1.0], vec![1.0]).unwrap_err();
        assert_eq!(err, PeriodogramError::InsufficientData { needed: 2, got: 1 });
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new(vec![0.0, 1.0], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            PeriodogramError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn rejects_zero_span() {
        let err = TimeSeries::new(vec![2.0, 2.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PeriodogramError::DegenerateInput(_)));
    }

    #[test]
    fn rejects_non_positive_weights() {
        let err = TimeSeries::weighted(vec![0.0, 1.0], vec![1.0, 2.0], vec![1.0, 0.0]).unwrap_err();
        assert!(matches!(err, PeriodogramError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = TimeSeries::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, PeriodogramError::InvalidParameter(_)));
    }

    #[test]
    fn builder_converts_errors_to_weights() {
        let ts = TimeSeries::builder()
            .times(vec![0.0, 1.0, 2.0])
            .values(vec![1.0, 2.0, 3.0])
            .errors(&[0.5, 1.0, 2.0])
            .build()
            .unwrap();
        let w = ts.weights().unwrap();
        assert_relative_eq!(w[0], 4.0);
        assert_relative_eq!(w[1], 1.0);
        assert_relative_eq!(w[2], 0.25);
    }

    #[test]
    fn median_interval_ignores_order_and_duplicates() {
        let ts = TimeSeries::new(
            vec![3.0, 0.0, 1.0, 1.0, 2.0, 10.0],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        // positive gaps of sorted times: 1, 1, 1, 7
        assert_relative_eq!(ts.median_interval().unwrap(), 1.0);
    }

    #[test]
    fn sampling_interval_detects_equidistant_series() {
        let times: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let ts = TimeSeries::new(times, vec![0.0; 10]).unwrap();
        assert_relative_eq!(ts.sampling_interval().unwrap(), 0.5, epsilon = 1e-12);

        let ts = TimeSeries::new(vec![0.0, 1.0, 3.0], vec![0.0; 3]).unwrap();
        assert!(ts.sampling_interval().is_none());
    }

    #[test]
    fn weighted_centering_removes_weighted_mean() {
        let ts = TimeSeries::weighted(vec![0.0, 1.0], vec![0.0, 10.0], vec![1.0, 3.0]).unwrap();
        let centered = ts.weighted_centered();
        assert_relative_eq!(centered.weighted_mean(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(centered.values()[0], -7.5, epsilon = 1e-12);
    }
}
