//! Spectral window of a sampling pattern.

use std::f64::consts::PI;

use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};
use crate::estimators::Estimator;

/// Squared modulus of the window function of `times` at each of `freqs`.
///
/// `|W(f)|² = [(Σ cos 2πf tᵢ)² + (Σ sin 2πf tᵢ)²] / N²`, so that `|W(0)|² = 1`.
/// Times need not be equidistant.
///
/// # Example
/// ```
/// use anofox_periodogram::spectral::window_function;
///
/// let times = [0.0, 0.7, 1.1, 2.9, 4.0];
/// let w = window_function(&times, &[0.0, 0.3]).unwrap();
/// assert_eq!(w[0], 1.0);
/// assert!(w[1] < 1.0);
/// ```
pub fn window_function(times: &[f64], freqs: &[f64]) -> Result<Vec<f64>> {
    if times.is_empty() {
        return Err(PeriodogramError::DegenerateInput(
            "window function needs at least one time point".to_string(),
        ));
    }
    let n2 = (times.len() as f64).powi(2);
    Ok(freqs
        .iter()
        .map(|&f| window_power(times, f) / n2)
        .collect())
}

#[inline]
fn window_power(times: &[f64], freq: f64) -> f64 {
    let omega = 2.0 * PI * freq;
    let (mut sc, mut ss) = (0.0, 0.0);
    for &t in times {
        let (s, c) = (omega * t).sin_cos();
        sc += c;
        ss += s;
    }
    sc * sc + ss * ss
}

/// The window function as a periodogram estimator, so it can be evaluated on
/// a resolved grid and partitioned like any other method.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralWindow;

impl Estimator for SpectralWindow {
    fn name(&self) -> &'static str {
        "SpectralWindow"
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        window_function(series.times(), &grid.frequencies())
    }
}
