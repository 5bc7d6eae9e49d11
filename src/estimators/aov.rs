//! Multi-harmonic analysis of variance periodogram (Schwarzenberg-Czerny 1996).

use std::f64::consts::PI;

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};
use crate::utils::stats::frac;

/// Relative squared norm below which an orthogonalized column is dropped.
const RANK_TOLERANCE: f64 = 1e-10;

/// Model fitted at each trial frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AovMode {
    /// Fourier series of `nh` harmonics, fitted by orthogonal projection.
    #[default]
    Harmonic,
    /// Classical phase-binned AoV with the given number of equal phase bins.
    PhaseBins(usize),
}

/// Multi-harmonic AoV periodogram.
///
/// In [`AovMode::Harmonic`] the centered signal is projected onto
/// `cos kωt, sin kωt` for `k = 1..=nh`, orthogonalized against the mean, and
///
/// `F = (n − r − 1)/r · explained / residual`
///
/// with `r` the effective rank of the harmonic design. Columns that vanish on
/// the sampling pattern (e.g. at `f = 0` or a Nyquist-like frequency) reduce
/// `r` rather than failing. With `nh = 1` the statistic is a monotone function
/// of the generalised Lomb-Scargle power.
///
/// The statistic is F-distributed under white noise and is not passed
/// through a [`Normalization`](crate::spectral::Normalization).
#[derive(Debug, Clone)]
pub struct MultiHarmonicAov {
    /// Number of harmonics.
    pub nh: usize,
    pub mode: AovMode,
}

impl Default for MultiHarmonicAov {
    fn default() -> Self {
        Self {
            nh: 2,
            mode: AovMode::Harmonic,
        }
    }
}

impl MultiHarmonicAov {
    pub fn new(nh: usize) -> Self {
        Self {
            nh,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: AovMode) -> Self {
        self.mode = mode;
        self
    }

    fn harmonic_statistic(
        &self,
        times: &[f64],
        centered: &[f64],
        total: f64,
        freq: f64,
        basis: &mut Vec<Vec<f64>>,
    ) -> f64 {
        let n = times.len();
        let constant = 1.0 / (n as f64).sqrt();
        basis.clear();

        let mut explained = 0.0;
        for k in 1..=self.nh {
            let omega = 2.0 * PI * freq * k as f64;
            let (cosines, sines): (Vec<f64>, Vec<f64>) = times
                .iter()
                .map(|&t| {
                    let (sin, cos) = (omega * t).sin_cos();
                    (cos, sin)
                })
                .unzip();
            for mut column in [cosines, sines] {
                let raw_norm: f64 = column.iter().map(|v| v * v).sum();

                let mean_part: f64 = column.iter().sum::<f64>() * constant;
                column.iter_mut().for_each(|v| *v -= mean_part * constant);
                for q in basis.iter() {
                    let proj = dot(q, &column);
                    column.iter_mut().zip(q.iter()).for_each(|(v, qi)| *v -= proj * qi);
                }

                let norm: f64 = column.iter().map(|v| v * v).sum();
                if raw_norm == 0.0 || norm <= RANK_TOLERANCE * raw_norm {
                    continue;
                }
                let scale = norm.sqrt();
                column.iter_mut().for_each(|v| *v /= scale);
                explained += dot(&column, centered).powi(2);
                basis.push(column);
            }
        }

        let rank = basis.len();
        if rank == 0 || n <= rank + 1 {
            return 0.0;
        }
        let residual = (total - explained).max(total * f64::EPSILON);
        (n - rank - 1) as f64 / rank as f64 * explained / residual
    }

    fn binned_statistic(&self, times: &[f64], centered: &[f64], total: f64, nbins: usize, freq: f64) -> f64 {
        let t0 = times[0];
        let mut sums = vec![0.0; nbins];
        let mut counts = vec![0usize; nbins];
        for (&t, &x) in times.iter().zip(centered.iter()) {
            let bin = ((frac((t - t0) * freq) * nbins as f64) as usize).min(nbins - 1);
            sums[bin] += x;
            counts[bin] += 1;
        }

        // centered values have zero grand mean
        let between: f64 = sums
            .iter()
            .zip(counts.iter())
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| s * s / c as f64)
            .sum();
        let occupied = counts.iter().filter(|&&c| c > 0).count();
        let n = times.len();
        if occupied < 2 || n <= occupied {
            return 0.0;
        }
        let within = (total - between).max(total * f64::EPSILON);
        (between / (occupied - 1) as f64) / (within / (n - occupied) as f64)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl Estimator for MultiHarmonicAov {
    fn name(&self) -> &'static str {
        "MultiHarmonicAov"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        let n = series.len();
        match self.mode {
            AovMode::Harmonic => {
                if self.nh == 0 {
                    return Err(PeriodogramError::InvalidParameter(
                        "nh must be at least 1".to_string(),
                    ));
                }
                if n <= 2 * self.nh + 1 {
                    return Err(PeriodogramError::InsufficientData {
                        needed: 2 * self.nh + 2,
                        got: n,
                    });
                }
            }
            AovMode::PhaseBins(bins) => {
                if bins < 2 {
                    return Err(PeriodogramError::InvalidParameter(format!(
                        "phase-binned AoV needs at least 2 bins, got {bins}"
                    )));
                }
                if n <= bins {
                    return Err(PeriodogramError::InsufficientData {
                        needed: bins + 1,
                        got: n,
                    });
                }
            }
        }
        if series.variance() <= 0.0 {
            return Err(PeriodogramError::DegenerateInput(
                "AoV statistic is undefined for a constant signal".to_string(),
            ));
        }
        Ok(())
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.validate(series)?;
        let times = series.times();
        let mean = series.mean();
        let centered: Vec<f64> = series.values().iter().map(|x| x - mean).collect();
        let total: f64 = centered.iter().map(|x| x * x).sum();

        let mut basis = Vec::with_capacity(2 * self.nh);
        Ok(grid
            .iter()
            .map(|f| match self.mode {
                AovMode::Harmonic => self.harmonic_statistic(times, &centered, total, f, &mut basis),
                AovMode::PhaseBins(bins) => self.binned_statistic(times, &centered, total, bins, f),
            })
            .collect())
    }
}
