//! Output normalization of power-like periodogram statistics.

use std::fmt;
use std::str::FromStr;

use crate::core::TimeSeries;
use crate::error::{PeriodogramError, Result};

/// Scale onto which a raw sum-of-squares statistic is mapped.
///
/// The raw statistic follows the convention `S ≈ A²·n/4` for a sinusoid of
/// semi-amplitude `A` sampled at `n` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Raw statistic, unchanged.
    Power,
    /// Semi-amplitude units: `sqrt(4/n)·sqrt(S)`.
    #[default]
    Amplitude,
    /// Divided by the signal variance; null distribution is exponential-like.
    Distribution,
    /// Power density `(4/n)·S·T` (Kjeldsen convention with `T` the time span).
    Density,
}

/// Series-level quantities a normalization depends on.
///
/// They are computed once from the full series, so every partition of a
/// frequency grid is scaled identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationScale {
    /// Number of samples.
    pub n: usize,
    /// Signal variance (weighted when the series carries weights).
    pub variance: f64,
    /// Time span `T`.
    pub span: f64,
    /// Whether the signal is constant.
    pub constant: bool,
}

impl NormalizationScale {
    /// Scale of `series`; uses the weighted variance when `weighted` and weights exist.
    pub fn from_series(series: &TimeSeries, weighted: bool) -> Self {
        let variance = if weighted {
            series.weighted_variance()
        } else {
            series.variance()
        };
        let values = series.values();
        Self {
            n: series.len(),
            variance,
            span: series.span(),
            constant: values.iter().all(|v| *v == values[0]),
        }
    }
}

impl Normalization {
    pub fn name(&self) -> &'static str {
        match self {
            Normalization::Power => "power",
            Normalization::Amplitude => "amplitude",
            Normalization::Distribution => "distribution",
            Normalization::Density => "density",
        }
    }

    /// Fail fast when the mode cannot be applied to a series of this scale.
    pub fn check(&self, scale: &NormalizationScale) -> Result<()> {
        if *self == Normalization::Distribution && (scale.constant || scale.variance <= 0.0) {
            return Err(PeriodogramError::DegenerateInput(
                "distribution normalization divides by the signal variance, which is zero"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Rescale `statistic` in place.
    pub fn apply(&self, statistic: &mut [f64], scale: &NormalizationScale) -> Result<()> {
        self.check(scale)?;
        let n = scale.n as f64;
        match self {
            Normalization::Power => {}
            Normalization::Amplitude => {
                let fact = (4.0 / n).sqrt();
                for s in statistic.iter_mut() {
                    *s = fact * s.max(0.0).sqrt();
                }
            }
            Normalization::Distribution => {
                for s in statistic.iter_mut() {
                    *s /= scale.variance;
                }
            }
            Normalization::Density => {
                let fact = 4.0 / n * scale.span;
                for s in statistic.iter_mut() {
                    *s *= fact;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Normalization {
    type Err = PeriodogramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "power" => Ok(Normalization::Power),
            "amplitude" => Ok(Normalization::Amplitude),
            "distribution" => Ok(Normalization::Distribution),
            "density" => Ok(Normalization::Density),
            other => Err(PeriodogramError::InvalidParameter(format!(
                "unknown normalization '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scale(n: usize, variance: f64, span: f64) -> NormalizationScale {
        NormalizationScale {
            n,
            variance,
            span,
            constant: false,
        }
    }

    #[test]
    fn power_is_identity() {
        let mut s = vec![1.0, 2.0, 3.0];
        Normalization::Power.apply(&mut s, &scale(4, 2.0, 10.0)).unwrap();
        assert_eq!(s, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn amplitude_round_trips_to_power() {
        let raw = vec![0.0, 0.5, 25.0, 100.0];
        let mut s = raw.clone();
        let sc = scale(100, 1.0, 1.0);
        Normalization::Amplitude.apply(&mut s, &sc).unwrap();
        for (a, r) in s.iter().zip(raw.iter()) {
            assert_relative_eq!(a * a / (4.0 / 100.0), *r, epsilon = 1e-10);
        }
    }

    #[test]
    fn amplitude_guards_negative_round_off() {
        let mut s = vec![-1e-18, 4.0];
        Normalization::Amplitude.apply(&mut s, &scale(4, 1.0, 1.0)).unwrap();
        assert_eq!(s[0], 0.0);
        assert_relative_eq!(s[1], 2.0);
    }

    #[test]
    fn distribution_divides_by_variance() {
        let mut s = vec![2.0, 4.0];
        Normalization::Distribution
            .apply(&mut s, &scale(4, 2.0, 1.0))
            .unwrap();
        assert_eq!(s, vec![1.0, 2.0]);
    }

    #[test]
    fn distribution_rejects_constant_signal() {
        let ts = TimeSeries::new(vec![0.0, 1.0, 2.0], vec![3.0, 3.0, 3.0]).unwrap();
        let sc = NormalizationScale::from_series(&ts, false);
        let mut s = vec![1.0];
        let err = Normalization::Distribution.apply(&mut s, &sc).unwrap_err();
        assert!(matches!(err, PeriodogramError::DegenerateInput(_)));
        // other modes do not divide by the variance
        assert!(Normalization::Amplitude.apply(&mut s, &sc).is_ok());
    }

    #[test]
    fn density_scales_by_span() {
        let mut s = vec![1.0];
        Normalization::Density.apply(&mut s, &scale(8, 1.0, 20.0)).unwrap();
        assert_relative_eq!(s[0], 10.0);
    }

    #[test]
    fn parses_from_names() {
        for mode in [
            Normalization::Power,
            Normalization::Amplitude,
            Normalization::Distribution,
            Normalization::Density,
        ] {
            assert_eq!(mode.name().parse::<Normalization>().unwrap(), mode);
        }
        assert_eq!(
            "AMPLITUDE".parse::<Normalization>().unwrap(),
            Normalization::Amplitude
        );
        assert!("energy".parse::<Normalization>().is_err());
    }

    #[test]
    fn weighted_scale_uses_weighted_variance() {
        let ts = TimeSeries::weighted(vec![0.0, 1.0], vec![0.0, 10.0], vec![1.0, 3.0]).unwrap();
        let plain = NormalizationScale::from_series(&ts, false);
        let weighted = NormalizationScale::from_series(&ts, true);
        assert_relative_eq!(plain.variance, 25.0);
        assert_relative_eq!(weighted.variance, 18.75);
    }
}
