//! Periodogram result container.

use crate::error::{PeriodogramError, Result};
use crate::utils::stats::median;

/// A frequency-indexed statistic produced by one estimator.
///
/// The meaning of `statistic` depends on the estimator and its normalization
/// (amplitude, power, density, F-statistic, θ-statistic, box statistic) and is
/// not comparable across methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Periodogram {
    frequencies: Vec<f64>,
    statistic: Vec<f64>,
    method: String,
}

impl Periodogram {
    /// Pair frequencies with a statistic of the same length.
    pub fn new(frequencies: Vec<f64>, statistic: Vec<f64>, method: &str) -> Result<Self> {
        if frequencies.len() != statistic.len() {
            return Err(PeriodogramError::DimensionMismatch {
                expected: frequencies.len(),
                got: statistic.len(),
            });
        }
        Ok(Self {
            frequencies,
            statistic,
            method: method.to_string(),
        })
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn statistic(&self) -> &[f64] {
        &self.statistic
    }

    /// Name of the estimator that produced this periodogram.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Consume into the `(frequencies, statistic)` pair.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.frequencies, self.statistic)
    }

    /// Periods `1/f` (infinite at `f = 0`).
    pub fn periods(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .map(|&f| if f > 0.0 { 1.0 / f } else { f64::INFINITY })
            .collect()
    }

    /// `(frequency, statistic)` at the maximum statistic, ignoring NaN.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.extreme(|candidate, best| candidate > best)
    }

    /// `(frequency, statistic)` at the minimum statistic, for θ-like statistics.
    pub fn trough(&self) -> Option<(f64, f64)> {
        self.extreme(|candidate, best| candidate < best)
    }

    /// Local maxima exceeding `threshold` times the median statistic.
    ///
    /// Returns `(frequency, statistic)` pairs sorted by statistic, highest first.
    pub fn peaks(&self, threshold: f64) -> Vec<(f64, f64)> {
        let finite: Vec<f64> = self
            .statistic
            .iter()
            .copied()
            .filter(|s| s.is_finite())
            .collect();
        if finite.len() < 3 {
            return Vec::new();
        }

        // Estimate noise floor as median statistic
        let noise_floor = median(&finite);
        let peak_threshold = noise_floor * threshold;

        let s = &self.statistic;
        let mut peaks: Vec<(f64, f64)> = (1..s.len() - 1)
            .filter(|&i| s[i] > s[i - 1] && s[i] >= s[i + 1] && s[i] > peak_threshold)
            .map(|i| (self.frequencies[i], s[i]))
            .collect();

        // Sort by statistic (highest first)
        peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        peaks
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for (&f, &s) in self.frequencies.iter().zip(self.statistic.iter()) {
            if s.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if !better(s, current) => {}
                _ => best = Some((f, s)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Periodogram {
        Periodogram::new(
            vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            vec![0.1, 0.2, 5.0, 0.3, 0.2, 2.0, 0.1],
            "test",
        )
        .unwrap()
    }

    #[test]
    fn rejects_misaligned_arrays() {
        let err = Periodogram::new(vec![0.0, 1.0], vec![1.0], "test").unwrap_err();
        assert_eq!(
            err,
            PeriodogramError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn peak_and_trough() {
        let p = sample();
        assert_eq!(p.peak(), Some((0.2, 5.0)));
        assert_eq!(p.trough(), Some((0.0, 0.1)));
        assert_eq!(p.method(), "test");
    }

    #[test]
    fn peak_skips_nan() {
        let p = Periodogram::new(vec![0.0, 1.0, 2.0], vec![f64::NAN, 1.0, 0.5], "test").unwrap();
        assert_eq!(p.peak(), Some((1.0, 1.0)));
    }

    #[test]
    fn peaks_are_sorted_and_thresholded() {
        let p = sample();
        let peaks = p.peaks(2.0);
        assert_eq!(peaks, vec![(0.2, 5.0), (0.5, 2.0)]);

        let peaks = p.peaks(15.0);
        assert_eq!(peaks, vec![(0.2, 5.0)]);
    }

    #[test]
    fn periods_are_reciprocal() {
        let p = sample();
        let periods = p.periods();
        assert!(periods[0].is_infinite());
        assert!((periods[2] - 5.0).abs() < 1e-12);
    }
}
