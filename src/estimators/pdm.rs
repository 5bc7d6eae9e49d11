//! Phase dispersion minimization (Jurkevich 1971, Stellingwerf 1978).

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};
use crate::utils::stats::{frac, population_variance};

/// Phase dispersion minimization θ-statistic.
///
/// At each frequency the times are folded into phases
/// `φ = frac((t − t₀)·f + D/2·t²)` with `t₀` the first time and `D` an
/// optional linear frequency drift. The unit phase interval is split into
/// `nbin` bins, replicated at `ncover` cyclic shifts of `1/(nbin·ncover)`.
/// Every non-empty bin contributes `(count − 1)·var(bin)`; the sum is divided
/// by `ncover·N − (ncover·nbin − N_empty)` and by the variance of the signal.
///
/// Lower θ means stronger phase coherence. The statistic is scale invariant
/// and is not passed through a [`Normalization`](crate::spectral::Normalization).
#[derive(Debug, Clone)]
pub struct Pdm {
    /// Number of phase bins.
    pub nbin: usize,
    /// Number of covers (bin shifts).
    pub ncover: usize,
    /// Linear frequency drift.
    pub drift: f64,
}

impl Default for Pdm {
    fn default() -> Self {
        Self {
            nbin: 5,
            ncover: 2,
            drift: 0.0,
        }
    }
}

impl Pdm {
    pub fn new(nbin: usize, ncover: usize) -> Self {
        Self {
            nbin,
            ncover,
            ..Self::default()
        }
    }

    /// Set the linear frequency drift `D`.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    fn theta(
        &self,
        series: &TimeSeries,
        freq: f64,
        phases: &mut Vec<f64>,
        bin: &mut Vec<f64>,
    ) -> Result<f64> {
        let (times, values) = (series.times(), series.values());
        let t0 = times[0];
        phases.clear();
        phases.extend(
            times
                .iter()
                .map(|&t| frac((t - t0) * freq + 0.5 * self.drift * t * t)),
        );

        let binsize = 1.0 / self.nbin as f64;
        let covershift = 1.0 / (self.nbin * self.ncover) as f64;
        let mut theta = 0.0;
        let mut empty = 0usize;
        for k in 0..self.nbin {
            for c in 0..self.ncover {
                let left = frac(k as f64 * binsize + c as f64 * covershift);
                let right = frac((k + 1) as f64 * binsize + c as f64 * covershift);

                bin.clear();
                // A bin crossing phase 1 wraps around to 0
                let inside = |phi: f64| {
                    if left < right {
                        left <= phi && phi < right
                    } else {
                        !(right <= phi && phi < left)
                    }
                };
                bin.extend(
                    phases
                        .iter()
                        .zip(values.iter())
                        .filter(|(phi, _)| inside(**phi))
                        .map(|(_, x)| *x),
                );

                if bin.is_empty() {
                    empty += 1;
                } else {
                    theta += (bin.len() - 1) as f64 * population_variance(bin);
                }
            }
        }

        let dof = (self.ncover * series.len()) as f64 - (self.ncover * self.nbin - empty) as f64;
        // every point alone in its bin leaves no degrees of freedom
        if dof <= 0.0 {
            return Err(PeriodogramError::NumericalDegeneracy { frequency: freq });
        }
        Ok(theta / dof)
    }
}

impl Estimator for Pdm {
    fn name(&self) -> &'static str {
        "Pdm"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        if self.nbin == 0 || self.ncover == 0 {
            return Err(PeriodogramError::InvalidParameter(format!(
                "nbin and ncover must be at least 1, got {} and {}",
                self.nbin, self.ncover
            )));
        }
        if !self.drift.is_finite() {
            return Err(PeriodogramError::InvalidParameter(format!(
                "drift must be finite, got {}",
                self.drift
            )));
        }
        if series.len() <= self.nbin {
            return Err(PeriodogramError::InsufficientData {
                needed: self.nbin + 1,
                got: series.len(),
            });
        }
        if series.variance() <= 0.0 {
            return Err(PeriodogramError::DegenerateInput(
                "PDM divides by the signal variance, which is zero".to_string(),
            ));
        }
        Ok(())
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.validate(series)?;
        let variance = series.variance();
        let mut phases = Vec::with_capacity(series.len());
        let mut bin = Vec::with_capacity(series.len());
        grid.iter()
            .map(|f| Ok(self.theta(series, f, &mut phases, &mut bin)? / variance))
            .collect()
    }
}
