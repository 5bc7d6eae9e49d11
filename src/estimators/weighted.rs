//! Weighted least-squares sine fit power spectrum.

use std::f64::consts::PI;

use super::{Estimator, SingularPolicy};
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::Result;

/// Determinant threshold relative to `(Σw)²`.
const SINGULAR_EPS: f64 = 1e-12;

/// Weighted power spectrum.
///
/// For each frequency `f ≠ 0` the model `A·sin 2πft + B·cos 2πft` is fitted
/// by chi-square minimization with the series weights (`1/σ²`, uniform when
/// absent) and the statistic is `A² + B²`. At `f = 0` the statistic is the
/// mean of the signal.
///
/// Where the 2×2 normal equations are singular the configured
/// [`SingularPolicy`] decides the outcome.
#[derive(Debug, Clone, Default)]
pub struct WeightedSineFit {
    pub singular: SingularPolicy,
}

impl WeightedSineFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for singular frequencies.
    pub fn with_singular_policy(mut self, policy: SingularPolicy) -> Self {
        self.singular = policy;
        self
    }

    fn power_at(&self, series: &TimeSeries, freq: f64) -> Result<f64> {
        let (times, values) = (series.times(), series.values());
        if freq == 0.0 {
            return Ok(values.iter().sum::<f64>() / values.len() as f64);
        }

        let weights = series.weights();
        let omega = 2.0 * PI * freq;
        let (mut a11, mut a12, mut a22, mut b1, mut b2, mut total) =
            (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        for (i, (&t, &x)) in times.iter().zip(values.iter()).enumerate() {
            let w = weights.map_or(1.0, |w| w[i]);
            let (sine, cosine) = (omega * t).sin_cos();
            a11 += w * sine * sine;
            a12 += w * sine * cosine;
            a22 += w * cosine * cosine;
            b1 += w * x * sine;
            b2 += w * x * cosine;
            total += w;
        }
        let a21 = a12;

        let denominator = a11 * a22 - a12 * a21;
        if denominator <= SINGULAR_EPS * total * total {
            return self.singular.resolve(freq, || {
                // Collinear columns: fit the better-conditioned one alone
                if a11 >= a22 {
                    (b1 / a11).powi(2)
                } else {
                    (b2 / a22).powi(2)
                }
            });
        }

        let a = (b1 * a22 - b2 * a12) / denominator;
        let b = (b2 * a11 - b1 * a21) / denominator;
        Ok(a * a + b * b)
    }
}

impl Estimator for WeightedSineFit {
    fn name(&self) -> &'static str {
        "WeightedSineFit"
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        grid.iter().map(|f| self.power_at(series, f)).collect()
    }
}
