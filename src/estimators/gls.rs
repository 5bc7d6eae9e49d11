//! Generalised Lomb-Scargle periodogram (Zechmeister & Kürster 2009).

use std::f64::consts::PI;

use super::{error_weights, Estimator, SingularPolicy};
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};

/// Determinant threshold; weights are normalized so all sums are at most one.
const SINGULAR_EPS: f64 = 1e-12;

/// Weighted sums of a two-column trigonometric design at one frequency.
///
/// `y` is centered on its weighted mean, so `Σ w y = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DesignSums {
    c: f64,
    s: f64,
    yc: f64,
    ys: f64,
    cc: f64,
    ss: f64,
    cs: f64,
}

impl DesignSums {
    /// Accumulate over `(weight, centered value, cos column, sin column)`.
    pub(crate) fn accumulate(points: impl Iterator<Item = (f64, f64, f64, f64)>) -> Self {
        let mut sums = Self::default();
        for (w, y, cos, sin) in points {
            sums.c += w * cos;
            sums.s += w * sin;
            sums.yc += w * y * cos;
            sums.ys += w * y * sin;
            sums.cc += w * cos * cos;
            sums.ss += w * sin * sin;
            sums.cs += w * cos * sin;
        }
        sums
    }

    /// Fraction of `yy` explained by `offset + a·cos + b·sin`.
    pub(crate) fn floating_mean_power(
        &self,
        yy: f64,
        policy: SingularPolicy,
        freq: f64,
    ) -> Result<f64> {
        let cc = self.cc - self.c * self.c;
        let ss = self.ss - self.s * self.s;
        let cs = self.cs - self.c * self.s;
        fit_power(self.yc, self.ys, cc, ss, cs, yy, policy, freq)
    }

    /// Fraction of `yy` explained by `a·cos + b·sin` without an offset term.
    fn fixed_mean_power(&self, yy: f64) -> f64 {
        fit_power(
            self.yc,
            self.ys,
            self.cc,
            self.ss,
            self.cs,
            yy,
            SingularPolicy::ReducedRank,
            0.0,
        )
        .unwrap_or(0.0)
    }

    /// `|Σ w e^{iωt}|²` with normalized weights.
    fn window_power(&self) -> f64 {
        self.c * self.c + self.s * self.s
    }
}

fn fit_power(
    yc: f64,
    ys: f64,
    cc: f64,
    ss: f64,
    cs: f64,
    yy: f64,
    policy: SingularPolicy,
    freq: f64,
) -> Result<f64> {
    let d = cc * ss - cs * cs;
    if d <= SINGULAR_EPS {
        return policy.resolve(freq, || {
            if cc >= ss && cc > SINGULAR_EPS {
                yc * yc / (yy * cc)
            } else if ss > SINGULAR_EPS {
                ys * ys / (yy * ss)
            } else {
                0.0
            }
        });
    }
    Ok((ss * yc * yc + cc * ys * ys - 2.0 * cs * yc * ys) / (yy * d))
}

/// Weighted values centered on their weighted mean, and their weighted variance.
pub(crate) fn centered_signal(series: &TimeSeries, weights: &[f64]) -> Result<(Vec<f64>, f64)> {
    let values = series.values();
    if values.iter().all(|v| *v == values[0]) {
        return Err(PeriodogramError::DegenerateInput(
            "signal has zero variance".to_string(),
        ));
    }
    let mean: f64 = weights.iter().zip(values).map(|(w, y)| w * y).sum();
    let centered: Vec<f64> = values.iter().map(|y| y - mean).collect();
    let yy = weights
        .iter()
        .zip(centered.iter())
        .map(|(w, y)| w * y * y)
        .sum();
    Ok((centered, yy))
}

/// Secondary spectra of the generalised Lomb-Scargle computation.
#[derive(Debug, Clone, PartialEq)]
pub struct GlsSpectra {
    /// Generalised (floating-mean) power in `[0, 1]`.
    pub power: Vec<f64>,
    /// Classical Lomb-Scargle power of the weighted-mean-subtracted data.
    pub ls_power: Vec<f64>,
    /// Weighted spectral window power.
    pub window: Vec<f64>,
}

/// Generalised Lomb-Scargle periodogram.
///
/// Fits `c + a·cos ωt + b·sin ωt` by weighted least squares at every
/// frequency; the statistic is the fraction of the weighted variance the fit
/// explains, in `[0, 1]`. Weights are `∝ σ^-wexp` with `σ` derived from the
/// series weights (`1/σ²`); without weights all points count equally.
///
/// At `f = 0` the cosine column coincides with the offset and the power is 0.
#[derive(Debug, Clone)]
pub struct Gls {
    /// Exponent of the error weighting (default 2, i.e. `1/σ²`).
    pub wexp: f64,
    pub singular: SingularPolicy,
}

impl Default for Gls {
    fn default() -> Self {
        Self {
            wexp: 2.0,
            singular: SingularPolicy::default(),
        }
    }
}

impl Gls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error weighting exponent.
    pub fn with_wexp(mut self, wexp: f64) -> Self {
        self.wexp = wexp;
        self
    }

    /// Set the policy for singular frequencies.
    pub fn with_singular_policy(mut self, policy: SingularPolicy) -> Self {
        self.singular = policy;
        self
    }

    /// Power, classical Lomb-Scargle power and window power over `grid`.
    pub fn spectra(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<GlsSpectra> {
        self.validate(series)?;
        let weights = error_weights(series, self.wexp);
        let (y, yy) = centered_signal(series, &weights)?;

        let mut spectra = GlsSpectra {
            power: Vec::with_capacity(grid.len()),
            ls_power: Vec::with_capacity(grid.len()),
            window: Vec::with_capacity(grid.len()),
        };
        for freq in grid.iter() {
            let omega = 2.0 * PI * freq;
            let sums = DesignSums::accumulate(series.times().iter().enumerate().map(|(i, &t)| {
                let (sin, cos) = (omega * t).sin_cos();
                (weights[i], y[i], cos, sin)
            }));
            let power = if freq == 0.0 {
                0.0
            } else {
                sums.floating_mean_power(yy, self.singular, freq)?
            };
            spectra.power.push(power);
            spectra.ls_power.push(sums.fixed_mean_power(yy));
            spectra.window.push(sums.window_power());
        }
        Ok(spectra)
    }
}

impl Estimator for Gls {
    fn name(&self) -> &'static str {
        "Gls"
    }

    fn validate(&self, series: &TimeSeries) -> Result<()> {
        if !self.wexp.is_finite() {
            return Err(PeriodogramError::InvalidParameter(format!(
                "wexp must be finite, got {}",
                self.wexp
            )));
        }
        centered_signal(series, &error_weights(series, self.wexp)).map(|_| ())
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.spectra(series, grid).map(|s| s.power)
    }
}
