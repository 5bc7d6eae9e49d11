//! FFT spectra of equidistant time series.
//!
//! Provides Fast Fourier Transform based power and power density spectra.
//! The length of the series need not be a power of two.

use rustfft::{num_complex::Complex64, FftPlanner};

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};

/// Tolerance, in bins, for a grid frequency to coincide with an FFT bin.
const BIN_TOLERANCE: f64 = 1e-6;

/// Compute the FFT of a real-valued signal.
///
/// Only returns the first half (positive frequencies, `0..=N/2`) since the
/// input is real-valued and the spectrum is symmetric.
pub fn fft_real(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    // Convert to complex
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    // Perform FFT
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    // Return only positive frequencies (0 to N/2)
    buffer.truncate(n / 2 + 1);
    buffer
}

/// Scaling of an FFT spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftScale {
    /// `|X|²·4/N²`: a signal `A·sin(2πf₀t)` gives `A²` at `f₀` (if `f₀` is a bin).
    #[default]
    Power,
    /// `|X|²/N·Δt`: power per unit frequency.
    Density,
}

impl FftScale {
    fn factor(&self, n: usize, timestep: f64) -> f64 {
        let n = n as f64;
        match self {
            FftScale::Power => 4.0 / (n * n),
            FftScale::Density => timestep / n,
        }
    }
}

fn fft_spectrum(signal: &[f64], timestep: f64, scale: FftScale) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = signal.len();
    if n < 2 {
        return Err(PeriodogramError::InsufficientData { needed: 2, got: n });
    }
    if timestep.is_nan() || timestep <= 0.0 {
        return Err(PeriodogramError::InvalidParameter(format!(
            "timestep must be positive, got {timestep}"
        )));
    }
    let factor = scale.factor(n, timestep);
    let power: Vec<f64> = fft_real(signal)
        .iter()
        .map(|c| c.norm_sqr() * factor)
        .collect();
    let resolution = 1.0 / (n as f64 * timestep);
    let freqs = (0..power.len()).map(|k| k as f64 * resolution).collect();
    Ok((freqs, power))
}

/// Power spectrum of an equidistant series with sampling step `timestep`.
///
/// Returns `(frequencies, power)` on the native axis `k/(N·Δt)`, `k = 0..=N/2`.
///
/// # Example
/// ```
/// use anofox_periodogram::estimators::fft_power;
///
/// let signal: Vec<f64> = (0..64)
///     .map(|i| 2.0 * (2.0 * std::f64::consts::PI * i as f64 / 8.0).sin())
///     .collect();
/// let (freqs, power) = fft_power(&signal, 1.0).unwrap();
/// assert_eq!(freqs[8], 0.125);
/// assert!((power[8] - 4.0).abs() < 1e-9);
/// ```
pub fn fft_power(signal: &[f64], timestep: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    fft_spectrum(signal, timestep, FftScale::Power)
}

/// Power density spectrum of an equidistant series with sampling step `timestep`.
pub fn fft_power_density(signal: &[f64], timestep: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    fft_spectrum(signal, timestep, FftScale::Density)
}

/// FFT spectrum as an estimator.
///
/// Only defined for equidistant series (see [`TimeSeries::sampling_interval`]);
/// resampling irregular data is the caller's responsibility. The requested grid
/// is replaced by the native FFT axis, and the transform runs as a single unit.
#[derive(Debug, Clone, Default)]
pub struct FftSpectrum {
    pub scale: FftScale,
}

impl FftSpectrum {
    pub fn new(scale: FftScale) -> Self {
        Self { scale }
    }

    /// Set the spectrum scaling.
    pub fn with_scale(mut self, scale: FftScale) -> Self {
        self.scale = scale;
        self
    }

    fn timestep(series: &TimeSeries) -> Result<f64> {
        series.sampling_interval().ok_or_else(|| {
            PeriodogramError::InvalidParameter(
                "FFT spectrum requires an equidistant, time-ordered series".to_string(),
            )
        })
    }
}

impl Estimator for FftSpectrum {
    fn name(&self) -> &'static str {
        "FftSpectrum"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        Self::timestep(series).map(|_| ())
    }

    fn effective_grid(&self, series: &TimeSeries, _grid: FrequencyGrid) -> Result<FrequencyGrid> {
        let dt = Self::timestep(series)?;
        let n = series.len();
        FrequencyGrid::from_count(0.0, 1.0 / (n as f64 * dt), n / 2 + 1)
    }

    fn partitionable(&self) -> bool {
        false
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        let dt = Self::timestep(series)?;
        let n = series.len();
        let (_, power) = fft_spectrum(series.values(), dt, self.scale)?;
        grid.iter()
            .map(|f| {
                let bin = f * n as f64 * dt;
                let k = bin.round();
                if (bin - k).abs() > BIN_TOLERANCE || k as usize >= power.len() {
                    return Err(PeriodogramError::InvalidGrid(format!(
                        "frequency {f} is not on the FFT axis"
                    )));
                }
                Ok(power[k as usize])
            })
            .collect()
    }
}
