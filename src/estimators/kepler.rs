//! Keplerian periodogram (Zechmeister & Kürster 2009).

use std::f64::consts::PI;

use super::gls::{centered_signal, DesignSums};
use super::{error_weights, Estimator, SingularPolicy};
use crate::core::{grid_len, FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITER: usize = 50;

/// Solve Kepler's equation `E − e·sin E = M` for the eccentric anomaly `E`.
///
/// Newton iteration on `M` reduced to `[−π, π]`; the result lies in the same
/// range.
///
/// # Example
/// ```
/// use anofox_periodogram::estimators::solve_kepler;
///
/// let e = solve_kepler(1.0, 0.3);
/// assert!((e - 0.3 * e.sin() - 1.0).abs() < 1e-12);
/// ```
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let m = (mean_anomaly + PI).rem_euclid(2.0 * PI) - PI;
    let mut e_anom = if eccentricity > 0.8 { PI.copysign(m) } else { m };
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (e_anom - eccentricity * e_anom.sin() - m) / (1.0 - eccentricity * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    e_anom
}

/// Keplerian periodogram.
///
/// For every frequency, eccentricity `e ∈ e0..=en` (step `de`) and mean
/// anomaly offset `x0 ∈ x00..=x0n` (step `x0_step`, degrees), the true anomaly
/// `ν` of each observation is found by solving Kepler's equation and
/// `c + A·cos ν + B·sin ν` is fitted by weighted least squares. The statistic
/// is the best relative power over the `(e, x0)` grid, in `[0, 1]`.
///
/// With `e = 0` the model is a sinusoid and the statistic equals the
/// [`Gls`](super::Gls) power. Under [`SingularPolicy::Undefined`] a frequency
/// is NaN only when every `(e, x0)` fit is singular.
#[derive(Debug, Clone)]
pub struct Kepler {
    /// First eccentricity.
    pub e0: f64,
    /// Last eccentricity, below 1.
    pub en: f64,
    /// Eccentricity step.
    pub de: f64,
    /// First mean anomaly offset in degrees.
    pub x00: f64,
    /// Last mean anomaly offset in degrees.
    pub x0n: f64,
    /// Mean anomaly offset step in degrees.
    pub x0_step: f64,
    /// Exponent of the error weighting.
    pub wexp: f64,
    pub singular: SingularPolicy,
}

impl Default for Kepler {
    fn default() -> Self {
        Self {
            e0: 0.0,
            en: 0.91,
            de: 0.1,
            x00: 0.0,
            x0n: 359.9,
            x0_step: 20.0,
            wexp: 2.0,
            singular: SingularPolicy::default(),
        }
    }
}

impl Kepler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eccentricity grid `e0..=en` with step `de`.
    pub fn with_eccentricities(mut self, e0: f64, en: f64, de: f64) -> Self {
        self.e0 = e0;
        self.en = en;
        self.de = de;
        self
    }

    /// Set the mean anomaly offset grid in degrees.
    pub fn with_offsets(mut self, x00: f64, x0n: f64, x0_step: f64) -> Self {
        self.x00 = x00;
        self.x0n = x0n;
        self.x0_step = x0_step;
        self
    }

    pub fn with_wexp(mut self, wexp: f64) -> Self {
        self.wexp = wexp;
        self
    }

    pub fn with_singular_policy(mut self, policy: SingularPolicy) -> Self {
        self.singular = policy;
        self
    }

    fn eccentricities(&self) -> impl Iterator<Item = f64> + '_ {
        let count = if self.en > self.e0 {
            grid_len(self.e0, self.en, self.de)
        } else {
            1
        };
        (0..count).map(move |i| self.e0 + i as f64 * self.de)
    }

    fn offsets(&self) -> Vec<f64> {
        let count = if self.x0n > self.x00 {
            grid_len(self.x00, self.x0n, self.x0_step)
        } else {
            1
        };
        (0..count)
            .map(|i| (self.x00 + i as f64 * self.x0_step).to_radians())
            .collect()
    }
}

impl Estimator for Kepler {
    fn name(&self) -> &'static str {
        "Kepler"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        if !(self.e0 >= 0.0 && self.e0 <= self.en && self.en < 1.0) {
            return Err(PeriodogramError::InvalidParameter(format!(
                "eccentricities must satisfy 0 <= e0 <= en < 1, got e0={} en={}",
                self.e0, self.en
            )));
        }
        if self.de.is_nan() || self.de <= 0.0 || self.x0_step.is_nan() || self.x0_step <= 0.0 {
            return Err(PeriodogramError::InvalidParameter(format!(
                "grid steps must be positive, got de={} x0_step={}",
                self.de, self.x0_step
            )));
        }
        if !(self.x00.is_finite() && self.x0n.is_finite() && self.x00 <= self.x0n) {
            return Err(PeriodogramError::InvalidParameter(format!(
                "offsets must satisfy x00 <= x0n, got x00={} x0n={}",
                self.x00, self.x0n
            )));
        }
        if !self.wexp.is_finite() {
            return Err(PeriodogramError::InvalidParameter(format!(
                "wexp must be finite, got {}",
                self.wexp
            )));
        }
        centered_signal(series, &error_weights(series, self.wexp)).map(|_| ())
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.validate(series)?;
        let weights = error_weights(series, self.wexp);
        let (y, yy) = centered_signal(series, &weights)?;
        let times = series.times();
        let t0 = times[0];
        let offsets = self.offsets();

        let mut power = Vec::with_capacity(grid.len());
        for freq in grid.iter() {
            if freq == 0.0 {
                power.push(0.0);
                continue;
            }
            let omega = 2.0 * PI * freq;
            // combinations left undefined by the singular policy are skipped
            let mut best: Option<f64> = None;
            for e in self.eccentricities() {
                let root = (1.0 - e * e).sqrt();
                for &x0 in &offsets {
                    let sums = DesignSums::accumulate(times.iter().enumerate().map(|(i, &t)| {
                        let e_anom = solve_kepler(omega * (t - t0) + x0, e);
                        let (sin_e, cos_e) = e_anom.sin_cos();
                        let denominator = 1.0 - e * cos_e;
                        let cos_nu = (cos_e - e) / denominator;
                        let sin_nu = root * sin_e / denominator;
                        (weights[i], y[i], cos_nu, sin_nu)
                    }));
                    let p = sums.floating_mean_power(yy, self.singular, freq)?;
                    if !p.is_nan() {
                        best = Some(best.map_or(p, |b| b.max(p)));
                    }
                }
            }
            power.push(best.unwrap_or(f64::NAN));
        }
        Ok(power)
    }
}
