//! Periodogram estimators.
//!
//! Every estimator implements [`Estimator`] and can be run through
//! [`estimate`](crate::dispatch::estimate), which resolves the frequency grid
//! and optionally partitions it across worker threads:
//! - [`Scargle`]: classical (optionally weighted) Lomb-Scargle periodogram
//! - [`Deeming`]: direct Fourier transform periodogram (Deeming 1975)
//! - [`DftPower`]: direct Fourier power normalized to squared amplitude
//! - [`FftSpectrum`]: FFT power or power density of an equidistant series
//! - [`WeightedSineFit`]: weighted least-squares sine fit power
//! - [`Gls`]: generalised Lomb-Scargle periodogram (Zechmeister & Kürster 2009)
//! - [`Clean`]: CLEAN deconvolution (Roberts et al. 1987)
//! - [`MultiHarmonicAov`]: multi-harmonic analysis of variance (Schwarzenberg-Czerny 1996)
//! - [`Pdm`]: phase dispersion minimization (Stellingwerf 1978)
//! - [`Bls`]: box least squares with edge-effect correction (Kovács et al. 2002)
//! - [`Kepler`]: Keplerian periodogram over eccentricity and periastron phase

mod aov;
mod bls;
mod clean;
mod deeming;
mod fft;
mod gls;
mod kepler;
mod pdm;
mod scargle;
mod weighted;

pub use aov::{AovMode, MultiHarmonicAov};
pub use bls::{Bls, BlsFit, BlsSearch};
pub use clean::{Clean, FrequencyBin};
pub use deeming::{Deeming, DftPower};
pub use fft::{fft_power, fft_power_density, fft_real, FftScale, FftSpectrum};
pub use gls::{Gls, GlsSpectra};
pub use kepler::{solve_kepler, Kepler};
pub use pdm::Pdm;
pub use scargle::Scargle;
pub use weighted::WeightedSineFit;

use std::fmt::Debug;

use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};

/// A periodogram statistic computed over a frequency grid.
///
/// Implementations are read-only on their inputs and hold no state between
/// calls, so one value may be shared by all workers of a partitioned run.
pub trait Estimator: Send + Sync + Debug {
    /// Get the name of this estimator.
    fn name(&self) -> &'static str;

    /// Reject parameters or series this estimator cannot handle, before any computation.
    fn validate(&self, _series: &TimeSeries) -> Result<()> {
        Ok(())
    }

    /// Start frequency used when the caller leaves it unset.
    fn min_frequency(&self, _series: &TimeSeries) -> f64 {
        0.0
    }

    /// Adjust the resolved grid to the estimator's constraints.
    ///
    /// Called once on the full grid, never on partitions.
    fn effective_grid(&self, _series: &TimeSeries, grid: FrequencyGrid) -> Result<FrequencyGrid> {
        Ok(grid)
    }

    /// Whether the statistic at one frequency is independent of the rest of the grid.
    ///
    /// Non-partitionable estimators always run as a single unit.
    fn partitionable(&self) -> bool {
        true
    }

    /// Compute the statistic at every frequency of `grid`, in order.
    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>>;
}

/// What to do at a frequency where a least-squares design matrix is singular.
///
/// Singular designs occur where the sine or cosine column vanishes on the
/// sampling pattern, e.g. at the Nyquist frequency of integer-spaced times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularPolicy {
    /// Fit only the well-conditioned term.
    #[default]
    ReducedRank,
    /// Write NaN at that frequency.
    Undefined,
    /// Abort with [`PeriodogramError::NumericalDegeneracy`].
    Error,
}

impl SingularPolicy {
    /// Statistic at a singular frequency; `reduced` computes the reduced-rank fit.
    pub(crate) fn resolve(&self, frequency: f64, reduced: impl FnOnce() -> f64) -> Result<f64> {
        match self {
            SingularPolicy::ReducedRank => Ok(reduced()),
            SingularPolicy::Undefined => Ok(f64::NAN),
            SingularPolicy::Error => Err(PeriodogramError::NumericalDegeneracy { frequency }),
        }
    }
}

/// Normalized weights `∝ σ^-wexp` with `σ = weight^-½`, summing to one.
///
/// Uniform when the series carries no weights.
pub(crate) fn error_weights(series: &TimeSeries, wexp: f64) -> Vec<f64> {
    let raw: Vec<f64> = match series.weights() {
        Some(w) => w.iter().map(|wi| wi.powf(wexp / 2.0)).collect(),
        None => vec![1.0; series.len()],
    };
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn singular_policy_outcomes() {
        assert_eq!(SingularPolicy::ReducedRank.resolve(0.5, || 2.0), Ok(2.0));
        assert!(SingularPolicy::Undefined.resolve(0.5, || 2.0).unwrap().is_nan());
        assert_eq!(
            SingularPolicy::Error.resolve(0.5, || 2.0),
            Err(PeriodogramError::NumericalDegeneracy { frequency: 0.5 })
        );
    }

    #[test]
    fn error_weights_follow_exponent() {
        // weights 1/σ² = [4, 1] => σ = [0.5, 1]; wexp = 2 => ∝ [4, 1]
        let ts = TimeSeries::weighted(vec![0.0, 1.0], vec![0.0, 1.0], vec![4.0, 1.0]).unwrap();
        let w = error_weights(&ts, 2.0);
        assert_relative_eq!(w[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.2, epsilon = 1e-12);

        let w = error_weights(&ts, 0.0);
        assert_relative_eq!(w[0], 0.5, epsilon = 1e-12);
    }
}
