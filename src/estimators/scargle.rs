//! Classical Lomb-Scargle periodogram (Scargle 1982), optionally weighted.

use std::f64::consts::PI;

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::Result;
use crate::spectral::{Normalization, NormalizationScale};

/// Relative size below which a trigonometric column counts as vanished.
const COLUMN_EPS: f64 = 1e-12;

/// Scargle periodogram.
///
/// For each frequency the sine and cosine columns are made orthogonal by the
/// time shift `τ` with `tan 2ωτ = Σ wᵢ sin 2ωtᵢ / Σ wᵢ cos 2ωtᵢ`, and
///
/// `S = ½ · n/Σw · [(Σ wx cos)² / Σ w cos² + (Σ wx sin)² / Σ w sin²]`,
///
/// with unit weights for an unweighted series. For a sinusoid of
/// semi-amplitude `A`, `S ≈ A²·n/4`, so [`Normalization::Amplitude`] recovers `A`.
///
/// The mean is not removed: center the series first
/// ([`TimeSeries::centered`] or [`TimeSeries::weighted_centered`]).
#[derive(Debug, Clone, Default)]
pub struct Scargle {
    /// Output normalization (default: amplitude).
    pub normalization: Normalization,
}

impl Scargle {
    pub fn new(normalization: Normalization) -> Self {
        Self { normalization }
    }

    /// Set normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    fn scale(series: &TimeSeries) -> NormalizationScale {
        NormalizationScale::from_series(series, true)
    }
}

/// Raw Scargle statistic at one frequency.
fn scargle_power(times: &[f64], values: &[f64], weights: Option<&[f64]>, freq: f64) -> f64 {
    let weight = |i: usize| weights.map_or(1.0, |w| w[i]);
    let omega = 2.0 * PI * freq;

    let (mut s2, mut c2, mut total) = (0.0, 0.0, 0.0);
    for (i, &t) in times.iter().enumerate() {
        let w = weight(i);
        let (s, c) = (2.0 * omega * t).sin_cos();
        s2 += w * s;
        c2 += w * c;
        total += w;
    }
    let tau = if omega > 0.0 {
        0.5 * s2.atan2(c2) / omega
    } else {
        0.0
    };

    let (mut xc, mut xs, mut cc, mut ss) = (0.0, 0.0, 0.0, 0.0);
    for (i, (&t, &x)) in times.iter().zip(values.iter()).enumerate() {
        let w = weight(i);
        let (s, c) = (omega * (t - tau)).sin_cos();
        xc += w * x * c;
        xs += w * x * s;
        cc += w * c * c;
        ss += w * s * s;
    }

    // A column vanishing on the sampling pattern carries no information
    let mut sum = 0.0;
    if cc > COLUMN_EPS * total {
        sum += xc * xc / cc;
    }
    if ss > COLUMN_EPS * total {
        sum += xs * xs / ss;
    }
    0.5 * sum * times.len() as f64 / total
}

impl Estimator for Scargle {
    fn name(&self) -> &'static str {
        "Scargle"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        self.normalization.check(&Self::scale(series))
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        let (times, values, weights) = (series.times(), series.values(), series.weights());
        let mut power: Vec<f64> = grid
            .iter()
            .map(|f| scargle_power(times, values, weights, f))
            .collect();

        // The first frequency may be an undefined, non-variable term
        if grid.is_leading() && !power[0].is_finite() {
            power[0] = 0.0;
        }

        self.normalization.apply(&mut power, &Self::scale(series))?;
        Ok(power)
    }
}
