//! Direct Fourier transform periodograms for unevenly sampled data.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::Result;
use crate::spectral::{Normalization, NormalizationScale};

/// Discrete Fourier sum `Σ xᵢ e^{sign·2πi f tᵢ}`.
pub(crate) fn fourier_sum(times: &[f64], values: &[f64], freq: f64, sign: f64) -> Complex64 {
    let omega = sign * 2.0 * PI * freq;
    times
        .iter()
        .zip(values.iter())
        .map(|(&t, &x)| Complex64::from_polar(x, omega * t))
        .sum()
}

/// Deeming periodogram (Deeming 1975).
///
/// `S = |Σ xᵢ e^{-2πi f tᵢ}|² / n`, followed by the configured normalization.
/// No uniform spacing is assumed. Weights are not supported and are ignored.
#[derive(Debug, Clone, Default)]
pub struct Deeming {
    /// Output normalization (default: amplitude).
    pub normalization: Normalization,
}

impl Deeming {
    pub fn new(normalization: Normalization) -> Self {
        Self { normalization }
    }

    /// Set normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }
}

impl Estimator for Deeming {
    fn name(&self) -> &'static str {
        "Deeming"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        self.normalization
            .check(&NormalizationScale::from_series(series, false))
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        let n = series.len() as f64;
        let mut power: Vec<f64> = grid
            .iter()
            .map(|f| fourier_sum(series.times(), series.values(), f, -1.0).norm_sqr() / n)
            .collect();
        self.normalization
            .apply(&mut power, &NormalizationScale::from_series(series, false))?;
        Ok(power)
    }
}

/// Modulus square of the Fourier transform, scaled by `4/N²`.
///
/// A signal `A·sin(2πf₀t)` gives power `A²` at `f₀`. Units are the square of
/// the signal units; the statistic bypasses [`Normalization`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DftPower;

impl Estimator for DftPower {
    fn name(&self) -> &'static str {
        "DftPower"
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        let scale = 4.0 / (series.len() as f64).powi(2);
        Ok(grid
            .iter()
            .map(|f| fourier_sum(series.times(), series.values(), f, 1.0).norm_sqr() * scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(n: usize, amplitude: f64, freq: f64) -> TimeSeries {
        let times: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let values = times
            .iter()
            .map(|t| amplitude * (2.0 * PI * freq * t).sin())
            .collect();
        TimeSeries::new(times, values).unwrap()
    }

    #[test]
    fn dft_power_is_squared_amplitude() {
        // 0.1 cycles per unit over 100 units: an integer number of cycles
        let ts = sine(200, 3.0, 0.1);
        let grid = FrequencyGrid::new(0.1, 0.2, 0.1).unwrap();
        let power = DftPower.compute(&ts, &grid).unwrap();
        assert_relative_eq!(power[0], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn deeming_amplitude_matches_signal() {
        let ts = sine(200, 3.0, 0.1);
        let grid = FrequencyGrid::new(0.1, 0.2, 0.1).unwrap();
        let amp = Deeming::default().compute(&ts, &grid).unwrap();
        assert_relative_eq!(amp[0], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn deeming_power_relates_to_dft_power() {
        let ts = sine(150, 1.0, 0.23);
        let grid = FrequencyGrid::new(0.0, 1.0, 0.01).unwrap();
        let deeming = Deeming::new(Normalization::Power).compute(&ts, &grid).unwrap();
        let dft = DftPower.compute(&ts, &grid).unwrap();
        let n = ts.len() as f64;
        for (d, p) in deeming.iter().zip(dft.iter()) {
            assert_relative_eq!(d * 4.0 / n, *p, epsilon = 1e-9);
        }
    }
}
