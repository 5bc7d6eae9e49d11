//! Box least squares transit search with edge-effect correction
//! (Kovács, Zucker & Mazeh 2002).

use super::Estimator;
use crate::core::{FrequencyGrid, TimeSeries};
use crate::error::{PeriodogramError, Result};
use crate::utils::stats::frac;

/// Minimum number of in-transit points for a box to be considered.
const MIN_BIN_POINTS: usize = 5;

/// Best box found over a frequency grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlsFit {
    pub frequency: f64,
    /// Box statistic `sqrt(s²/(r(n − r)))` at `frequency`.
    pub power: f64,
    /// Depth of the box relative to the out-of-transit level.
    pub depth: f64,
    /// Fraction of the points inside the box.
    pub fraction: f64,
    /// Phase at which the box starts, in `[0, 1)`.
    pub start_phase: f64,
    /// Phase at which the box ends, in `(0, 1]`; below `start_phase` when the box wraps.
    pub end_phase: f64,
}

/// Box statistic over a grid together with the best box.
#[derive(Debug, Clone, PartialEq)]
pub struct BlsSearch {
    pub frequencies: Vec<f64>,
    pub statistic: Vec<f64>,
    pub best: BlsFit,
}

/// Box least squares periodogram.
///
/// At each frequency the mean-subtracted signal is folded into `nb` phase
/// bins and a box of `kmi..=kma` bins (`qmi`/`qma` of the period) is slid
/// over them. Bins are extended cyclically so a transit split across
/// phase 0 is still found. The statistic is `sqrt(max s²/(r(n − r)))` over all
/// boxes holding at least `max(qmi·n, 5)` points, with `s` the summed signal
/// and `r` the number of points in the box.
///
/// At least two cycles must fit the baseline: unset or lower start
/// frequencies are raised to exactly `2/T`.
#[derive(Debug, Clone)]
pub struct Bls {
    /// Number of phase bins.
    pub nb: usize,
    /// Minimum fractional transit length.
    pub qmi: f64,
    /// Maximum fractional transit length.
    pub qma: f64,
}

impl Default for Bls {
    fn default() -> Self {
        Self {
            nb: 50,
            qmi: 0.005,
            qma: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BestBox {
    power: f64,
    sum: f64,
    count: usize,
    first_bin: usize,
    last_bin: usize,
}

impl Bls {
    pub fn new(nb: usize, qmi: f64, qma: f64) -> Self {
        Self { nb, qmi, qma }
    }

    /// Statistic over `grid` and the parameters of the best box.
    pub fn search(&self, series: &TimeSeries, grid: FrequencyGrid) -> Result<BlsSearch> {
        self.validate(series)?;
        let grid = self.effective_grid(series, grid)?;
        let centered = series.centered();
        let n = series.len();

        let mut statistic = Vec::with_capacity(grid.len());
        let mut best: Option<(f64, BestBox)> = None;
        for freq in grid.iter() {
            let candidate = self.best_box(series.times(), centered.values(), freq);
            statistic.push(candidate.power.sqrt());
            if best.is_none_or(|(_, b)| candidate.power >= b.power) {
                best = Some((freq, candidate));
            }
        }

        let (frequency, found) = best.ok_or_else(|| {
            PeriodogramError::InvalidGrid("grid has zero samples".to_string())
        })?;
        let (r, total) = (found.count as f64, n as f64);
        let (depth, fraction) = if found.count > 0 {
            (-found.sum * total / (r * (total - r)), r / total)
        } else {
            (0.0, 0.0)
        };
        let nb = self.nb as f64;
        let last = if found.last_bin >= self.nb {
            found.last_bin - self.nb
        } else {
            found.last_bin
        };
        Ok(BlsSearch {
            frequencies: grid.frequencies(),
            statistic,
            best: BlsFit {
                frequency,
                power: found.power.sqrt(),
                depth,
                fraction,
                start_phase: found.first_bin as f64 / nb,
                end_phase: (last + 1) as f64 / nb,
            },
        })
    }

    fn bin_limits(&self, n: usize) -> (usize, usize, usize) {
        let nb = self.nb as f64;
        let kmi = ((self.qmi * nb) as usize).max(1);
        let kma = ((self.qma * nb) as usize + 1).min(self.nb - 1);
        let kkmi = ((n as f64 * self.qmi) as usize).max(MIN_BIN_POINTS);
        (kmi, kma, kkmi)
    }

    /// Best box at one frequency; `values` must be mean-subtracted.
    fn best_box(&self, times: &[f64], values: &[f64], freq: f64) -> BestBox {
        let n = times.len();
        let (kmi, kma, kkmi) = self.bin_limits(n);
        let t0 = times[0];

        let mut counts = vec![0usize; self.nb + kma];
        let mut sums = vec![0.0; self.nb + kma];
        for (&t, &v) in times.iter().zip(values.iter()) {
            let bin = ((frac((t - t0) * freq) * self.nb as f64) as usize).min(self.nb - 1);
            counts[bin] += 1;
            sums[bin] += v;
        }
        counts.copy_within(0..kma, self.nb);
        sums.copy_within(0..kma, self.nb);

        let mut best = BestBox::default();
        for i in 0..self.nb {
            let (mut width, mut inside, mut s) = (0usize, 0usize, 0.0);
            for j in i..=i + kma {
                width += 1;
                inside += counts[j];
                s += sums[j];
                if width < kmi || inside < kkmi || inside >= n {
                    continue;
                }
                let r = inside as f64;
                let power = s * s / (r * (n as f64 - r));
                if power >= best.power {
                    best = BestBox {
                        power,
                        sum: s,
                        count: inside,
                        first_bin: i,
                        last_bin: j,
                    };
                }
            }
        }
        best
    }
}

impl Estimator for Bls {
    fn name(&self) -> &'static str {
        "Bls"
    }

    fn validate(&self, _series: &TimeSeries) -> Result<()> {
        if self.nb < 2 {
            return Err(PeriodogramError::InvalidParameter(format!(
                "nb must be at least 2, got {}",
                self.nb
            )));
        }
        if !(self.qmi > 0.0 && self.qmi < self.qma && self.qma < 1.0) {
            return Err(PeriodogramError::InvalidParameter(format!(
                "transit fractions must satisfy 0 < qmi < qma < 1, got qmi={} qma={}",
                self.qmi, self.qma
            )));
        }
        Ok(())
    }

    fn min_frequency(&self, series: &TimeSeries) -> f64 {
        2.0 / series.span()
    }

    fn effective_grid(&self, series: &TimeSeries, grid: FrequencyGrid) -> Result<FrequencyGrid> {
        let fmin = self.min_frequency(series);
        if grid.start() < fmin {
            grid.with_start(fmin)
        } else {
            Ok(grid)
        }
    }

    fn compute(&self, series: &TimeSeries, grid: &FrequencyGrid) -> Result<Vec<f64>> {
        self.validate(series)?;
        let centered = series.centered();
        Ok(grid
            .iter()
            .map(|f| self.best_box(series.times(), centered.values(), f).power.sqrt())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit-depth transits of 10% duration at period 5, starting at phase 0.3.
    fn transit_series() -> TimeSeries {
        let times: Vec<f64> = (0..400)
            .map(|i| i as f64 * 0.25 + 0.1 * ((i * 7 % 11) as f64 / 11.0))
            .collect();
        let values = times
            .iter()
            .map(|t| {
                let phase = frac(t * 0.2);
                if (0.3..0.4).contains(&phase) {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect();
        TimeSeries::new(times, values).unwrap()
    }

    #[test]
    fn finds_transit_period_and_depth() {
        let ts = transit_series();
        let grid = FrequencyGrid::new(0.05, 0.5, 0.0005).unwrap();
        let search = Bls::default().search(&ts, grid).unwrap();
        let best = search.best;
        assert!((best.frequency - 0.2).abs() <= 0.001, "best f = {}", best.frequency);
        assert_relative_eq!(best.depth, 1.0, epsilon = 0.15);
        assert_relative_eq!(best.fraction, 0.1, epsilon = 0.03);
        assert!((best.start_phase - 0.3).abs() <= 0.05);
        assert_eq!(search.statistic.len(), search.frequencies.len());
    }

    #[test]
    fn start_is_raised_to_two_cycles() {
        let ts = transit_series();
        let requested = FrequencyGrid::new(0.0, 0.5, 0.001).unwrap();
        let grid = Bls::default().effective_grid(&ts, requested).unwrap();
        assert_eq!(grid.start(), 2.0 / ts.span());
        assert_eq!(grid.step(), 0.001);

        let requested = FrequencyGrid::new(0.1, 0.5, 0.001).unwrap();
        let grid = Bls::default().effective_grid(&ts, requested).unwrap();
        assert_eq!(grid.start(), 0.1);
    }

    #[test]
    fn statistic_matches_search() {
        let ts = transit_series();
        let grid = FrequencyGrid::new(0.15, 0.25, 0.01).unwrap();
        let est = Bls::default();
        let search = est.search(&ts, grid).unwrap();
        assert_eq!(est.compute(&ts, &grid).unwrap(), search.statistic);
    }

    #[test]
    fn rejects_inverted_fractions() {
        let ts = transit_series();
        assert!(matches!(
            Bls::new(50, 0.5, 0.1).validate(&ts),
            Err(PeriodogramError::InvalidParameter(_))
        ));
    }
}
