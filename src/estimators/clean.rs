//! CLEAN deconvolution of the Fourier spectrum (Roberts, Lehár & Dreher 1987).

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use super::deeming::fourier_sum;
use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};

/// Ratio between the full width at half maximum and σ of a Gaussian.
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// Below this `1 − |W(2ν)|²` the component is taken from the dirty spectrum alone.
const WINDOW_EPS: f64 = 1e-12;

/// A closed frequency interval cleaned as one independent sub-problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBin {
    pub start: f64,
    pub end: f64,
}

impl FrequencyBin {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    fn contains(&self, freq: f64) -> bool {
        freq >= self.start && freq <= self.end
    }
}

/// CLEANed amplitude spectrum.
///
/// Within each [`FrequencyBin`] the dirty spectrum `D(ν) = (1/N) Σ x e^{-2πiνt}`
/// of a residual copy of the (mean-subtracted) signal is searched for its
/// highest peak; the peak's complex amplitude, corrected for its own alias
/// through the spectral window at `2ν`, is scaled by `gain` and subtracted
/// from the residual in the time domain. After `niter` iterations the
/// collected components are restored with a Gaussian beam of FWHM `1/T` and
/// the residual spectrum is added back. The output is `2·|restored|`, in units
/// of the signal semi-amplitude; frequencies outside every bin carry the
/// dirty amplitude `2·|D|`.
///
/// Bins are independent: each starts from the full signal. The grid always
/// starts at `f = 0` and the estimator never runs on a partial grid.
#[derive(Debug, Clone)]
pub struct Clean {
    /// Bins to clean; empty means the whole grid.
    pub bins: Vec<FrequencyBin>,
    /// Number of iterations per bin.
    pub niter: usize,
    /// Fraction of each component removed per iteration, in `(0, 1]`.
    pub gain: f64,
}

impl Default for Clean {
    fn default() -> Self {
        Self {
            bins: Vec::new(),
            niter: 10,
            gain: 1.0,
        }
    }
}

impl Clean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bins(mut self, bins: Vec<FrequencyBin>) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_niter(mut self, niter: usize) -> Self {
        self.niter = niter;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Deconvolve the frequencies `freqs[indices]` and return their restored amplitudes.
    fn clean_bin(
        &self,
        times: &[f64],
        values: &[f64],
        freqs: &[f64],
        indices: &[usize],
        sigma: f64,
    ) -> Vec<f64> {
        let n = times.len() as f64;
        let dirty = |signal: &[f64], freq: f64| fourier_sum(times, signal, freq, -1.0) / n;
        let window = |freq: f64| -> Complex64 {
            let omega = -2.0 * PI * freq;
            times
                .iter()
                .map(|&t| Complex64::from_polar(1.0, omega * t))
                .sum::<Complex64>()
                / n
        };

        let mut residual = values.to_vec();
        let mut components: Vec<(f64, Complex64)> = Vec::with_capacity(self.niter);
        for _ in 0..self.niter {
            let peak = indices
                .iter()
                .map(|&i| (freqs[i], dirty(&residual, freqs[i])))
                .max_by(|a, b| a.1.norm_sqr().total_cmp(&b.1.norm_sqr()));
            let Some((freq, amplitude)) = peak else {
                break;
            };
            if amplitude.norm_sqr() == 0.0 {
                break;
            }

            let alpha = if freq == 0.0 {
                amplitude
            } else {
                let alias = window(2.0 * freq);
                let denominator = 1.0 - alias.norm_sqr();
                if denominator <= WINDOW_EPS {
                    amplitude
                } else {
                    (amplitude - amplitude.conj() * alias) / denominator
                }
            };
            let component = alpha * self.gain;

            let omega = 2.0 * PI * freq;
            for (r, &t) in residual.iter_mut().zip(times.iter()) {
                *r -= if freq == 0.0 {
                    component.re
                } else {
                    2.0 * (component * Complex64::from_polar(1.0, omega * t)).re
                };
            }
            components.push((freq, component));
        }

        indices
            .iter()
            .map(|&i| {
                let freq = freqs[i];
                let restored: Complex64 = components
                    .iter()
                    .map(|&(fc, a)| a * gaussian_beam(freq - fc, sigma))
                    .sum();
                2.0 * (restored + dirty(&residual, freq)).norm()
            })
            .collect()
    }
}

fn gaussian_beam(delta: f64, sigma: f64) -> f64 {
    (-0.5 * (delta / sigma).powi(2)).exp()
}

impl Estimator for Clean {
    fn name(&self) -> &'static str {
        "Clean"
    }

    fn validate(&self, _series: &TimeSeries) -> Result<()> {
        if self.gain.is_nan() || self.gain <= 0.0 || self.gain > 1.0 {
            return Err(PeriodogramError::InvalidParameter(format!(
                "gain must lie in (0, 1], got {}",
                self.gain
            )));
        }
        for bin in &self.bins {
            if !(bin.start.is_finite() && bin.end.is_finite()) || bin.start >= bin.end {
                return Err(PeriodogramError::InvalidParameter(format!(
                    "frequency bin [{}, {}] is empty or not finite",
                    bin.start, bin.end
                )));
            }
        }
        for pair in self.bins.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(PeriodogramError::InvalidParameter(format!(
                    "frequency bins must be sorted and disjoint, got [{}, {}] then [{}, {}]",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(())
    }

    fn effective_grid(&self, _series: &TimeSeries, grid: FrequencyGrid) -> Result<FrequencyGrid> {
        if grid.start() > 0.0 {
            grid.with_start(0.0)
        } else {
            Ok(grid)
        }
    }

    fn partitionable(&self) -> bool {
        false
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.validate(series)?;
        let times = series.times();
        let centered = series.centered();
        let values = centered.values();
        let n = series.len() as f64;
        let freqs = grid.frequencies();

        let mut amplitude: Vec<f64> = freqs
            .iter()
            .map(|&f| 2.0 * (fourier_sum(times, values, f, -1.0) / n).norm())
            .collect();

        let sigma = 1.0 / (series.span() * FWHM_PER_SIGMA);
        let whole = [FrequencyBin::new(grid.start(), grid.stop())];
        let bins: &[FrequencyBin] = if self.bins.is_empty() { &whole } else { &self.bins };
        for bin in bins {
            let indices: Vec<usize> = (0..freqs.len()).filter(|&i| bin.contains(freqs[i])).collect();
            if indices.is_empty() {
                continue;
            }
            let restored = self.clean_bin(times, values, &freqs, &indices, sigma);
            for (&i, a) in indices.iter().zip(restored) {
                amplitude[i] = a;
            }
        }
        Ok(amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::Deeming;
    use approx::assert_relative_eq;

    fn two_tone_series() -> TimeSeries {
        let times: Vec<f64> = (0..200)
            .map(|i| i as f64 * 0.5 + 0.2 * ((i * 7 % 11) as f64 / 11.0))
            .collect();
        let values = times
            .iter()
            .map(|t| 2.0 * (2.0 * PI * 0.1 * t).sin() + 0.8 * (2.0 * PI * 0.27 * t).cos())
            .collect();
        TimeSeries::new(times, values).unwrap()
    }

    fn index_of(grid: &FrequencyGrid, freq: f64) -> usize {
        ((freq - grid.start()) / grid.step()).round() as usize
    }

    #[test]
    fn restores_component_amplitudes() {
        let ts = two_tone_series();
        let grid = FrequencyGrid::new(0.0, 0.5, 0.002).unwrap();
        let amp = Clean::default().compute(&ts, &grid).unwrap();
        assert_relative_eq!(amp[index_of(&grid, 0.1)], 2.0, epsilon = 0.05);
        assert_relative_eq!(amp[index_of(&grid, 0.27)], 0.8, epsilon = 0.05);
        assert!(amp[index_of(&grid, 0.2)] < 0.05);
    }

    #[test]
    fn outside_bins_keeps_dirty_amplitude() {
        let ts = two_tone_series().centered();
        let grid = FrequencyGrid::new(0.0, 0.5, 0.002).unwrap();
        let est = Clean::default().with_bins(vec![FrequencyBin::new(0.2, 0.5)]);
        let amp = est.compute(&ts, &grid).unwrap();
        let dirty = Deeming::default().compute(&ts, &grid).unwrap();
        let below = index_of(&grid, 0.2) - 1;
        for (a, d) in amp.iter().zip(dirty.iter()).take(below) {
            assert_relative_eq!(a, d, epsilon = 1e-9);
        }
        assert_relative_eq!(amp[index_of(&grid, 0.27)], 0.8, epsilon = 0.1);
    }

    #[test]
    fn grid_always_starts_at_zero() {
        let ts = two_tone_series();
        let requested = FrequencyGrid::new(0.05, 0.5, 0.01).unwrap();
        let est = Clean::default();
        let grid = est.effective_grid(&ts, requested).unwrap();
        assert_eq!(grid.start(), 0.0);
        assert_relative_eq!(grid.stop(), 0.5, epsilon = 1e-12);
        assert!(!est.partitionable());
    }

    #[test]
    fn rejects_overlapping_bins_and_bad_gain() {
        let ts = two_tone_series();
        let overlapping = Clean::default()
            .with_bins(vec![FrequencyBin::new(0.0, 0.3), FrequencyBin::new(0.2, 0.5)]);
        assert!(matches!(
            overlapping.validate(&ts),
            Err(PeriodogramError::InvalidParameter(_))
        ));
        assert!(matches!(
            Clean::default().with_gain(0.0).validate(&ts),
            Err(PeriodogramError::InvalidParameter(_))
        ));
    }
}
