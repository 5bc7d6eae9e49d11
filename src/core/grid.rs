//! Frequency grids and their resolution from a time series.

use super::TimeSeries;
use crate::error::{PeriodogramError, Result};

/// Tolerance (in steps) guarding against round-off dropping the last sample.
const COUNT_TOLERANCE: f64 = 0.001;

/// Upper bound on the number of grid samples.
const MAX_GRID_LEN: usize = 100_000_000;

/// Default oversampling of the natural resolution `1/T`.
pub const DEFAULT_OVERSAMPLING: f64 = 10.0;

/// Number of samples of the grid `start..=stop` with spacing `step`.
///
/// `floor((stop − start)/step + 0.001) + 1`.
pub fn grid_len(start: f64, stop: f64, step: f64) -> usize {
    ((stop - start) / step + COUNT_TOLERANCE).floor() as usize + 1
}

/// An arithmetic sequence of trial frequencies.
///
/// A grid may be a contiguous window of a parent grid. Frequencies are always
/// computed from the parent origin, so a partition reproduces the parent's
/// frequencies bit for bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyGrid {
    origin: f64,
    step: f64,
    offset: usize,
    count: usize,
}

impl FrequencyGrid {
    /// Create the grid `start, start + step, …` up to `stop` (inclusive within tolerance).
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
            return Err(PeriodogramError::InvalidGrid(format!(
                "bounds must be finite (start={start}, stop={stop}, step={step})"
            )));
        }
        if step <= 0.0 {
            return Err(PeriodogramError::InvalidGrid(format!(
                "step must be positive, got {step}"
            )));
        }
        if start < 0.0 {
            return Err(PeriodogramError::InvalidGrid(format!(
                "start must be non-negative, got {start}"
            )));
        }
        if stop <= start {
            return Err(PeriodogramError::InvalidGrid(format!(
                "stop ({stop}) must exceed start ({start})"
            )));
        }
        let steps = (stop - start) / step;
        if steps >= MAX_GRID_LEN as f64 {
            return Err(PeriodogramError::InvalidGrid(format!(
                "grid would hold more than {MAX_GRID_LEN} frequencies"
            )));
        }
        Self::from_count(start, step, grid_len(start, stop, step))
    }

    /// Create a grid of `count` frequencies starting at `start`.
    pub fn from_count(start: f64, step: f64, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(PeriodogramError::InvalidGrid(
                "grid has zero samples".to_string(),
            ));
        }
        if step.is_nan() || step <= 0.0 || start.is_nan() || start < 0.0 {
            return Err(PeriodogramError::InvalidGrid(format!(
                "invalid grid origin {start} or step {step}"
            )));
        }
        Ok(Self {
            origin: start,
            step,
            offset: 0,
            count,
        })
    }

    /// The same grid restarted at `start`, keeping its step and stop frequency.
    pub fn with_start(&self, start: f64) -> Result<Self> {
        let stop = self.stop();
        if stop <= start {
            return Err(PeriodogramError::InvalidGrid(format!(
                "stop ({stop}) must exceed start ({start})"
            )));
        }
        Self::new(start, stop, self.step)
    }

    /// The `i`-th frequency of this grid.
    #[inline]
    pub fn frequency(&self, i: usize) -> f64 {
        self.origin + (self.offset + i) as f64 * self.step
    }

    pub fn start(&self) -> f64 {
        self.frequency(0)
    }

    pub fn stop(&self) -> f64 {
        self.frequency(self.count - 1)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false: grids hold at least one frequency.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of this grid's first frequency within its parent grid.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether this grid starts at its parent's first frequency.
    pub fn is_leading(&self) -> bool {
        self.offset == 0
    }

    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.count).map(|i| self.frequency(i)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.frequency(i))
    }

    /// Split into at most `parts` contiguous, disjoint windows whose sizes differ by at most one.
    pub fn partition(&self, parts: usize) -> Vec<FrequencyGrid> {
        let parts = parts.clamp(1, self.count);
        let base = self.count / parts;
        let extra = self.count % parts;
        let mut offset = self.offset;
        (0..parts)
            .map(|i| {
                let count = base + usize::from(i < extra);
                let part = FrequencyGrid {
                    origin: self.origin,
                    step: self.step,
                    offset,
                    count,
                };
                offset += count;
                part
            })
            .collect()
    }
}

/// Requested grid bounds; unset bounds are derived from the time series.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    /// Start frequency (default: 0, or the estimator's minimum).
    pub start: Option<f64>,
    /// Stop frequency (default: `0.5 / median(Δt)`).
    pub stop: Option<f64>,
    /// Frequency step (default: `1 / (oversampling · T)`).
    pub step: Option<f64>,
    /// Oversampling of the natural resolution `1/T` for the default step.
    pub oversampling: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
            oversampling: DEFAULT_OVERSAMPLING,
        }
    }
}

impl GridSpec {
    /// Fully specified bounds.
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: Some(step),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_stop(mut self, stop: f64) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_oversampling(mut self, oversampling: f64) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// Fill unset bounds from `series` and build the grid.
    ///
    /// `default_start` replaces an unset start; estimators that forbid low
    /// frequencies pass their minimum here.
    pub fn resolve(&self, series: &TimeSeries, default_start: f64) -> Result<FrequencyGrid> {
        let step = match self.step {
            Some(step) => step,
            None => {
                if self.oversampling.is_nan() || self.oversampling <= 0.0 {
                    return Err(PeriodogramError::InvalidGrid(format!(
                        "oversampling must be positive, got {}",
                        self.oversampling
                    )));
                }
                1.0 / (self.oversampling * series.span())
            }
        };
        let stop = match self.stop {
            Some(stop) => stop,
            None => {
                let interval = series.median_interval().ok_or_else(|| {
                    PeriodogramError::DegenerateInput(
                        "no positive sampling interval to derive a Nyquist frequency".to_string(),
                    )
                })?;
                0.5 / interval
            }
        };
        let start = self.start.unwrap_or(default_start);
        FrequencyGrid::new(start, stop, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_series(n: usize, dt: f64) -> TimeSeries {
        let times: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        TimeSeries::new(times, vec![0.0; n]).unwrap()
    }

    #[test]
    fn grid_length_matches_formula() {
        let grid = FrequencyGrid::new(0.0, 0.5, 0.01).unwrap();
        assert_eq!(grid.len(), 51);
        assert_relative_eq!(grid.start(), 0.0);
        assert_relative_eq!(grid.stop(), 0.5, epsilon = 1e-12);

        let grid = FrequencyGrid::new(0.1, 1.0, 0.3).unwrap();
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn grid_is_strictly_increasing() {
        let grid = FrequencyGrid::new(0.2, 3.0, 0.07).unwrap();
        let freqs = grid.frequencies();
        assert_eq!(freqs[0], 0.2);
        assert!(freqs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert!(matches!(
            FrequencyGrid::new(1.0, 1.0, 0.1),
            Err(PeriodogramError::InvalidGrid(_))
        ));
        assert!(matches!(
            FrequencyGrid::new(0.0, 1.0, 0.0),
            Err(PeriodogramError::InvalidGrid(_))
        ));
        assert!(matches!(
            FrequencyGrid::new(0.0, 1.0, -0.1),
            Err(PeriodogramError::InvalidGrid(_))
        ));
        assert!(matches!(
            FrequencyGrid::new(-1.0, 1.0, 0.1),
            Err(PeriodogramError::InvalidGrid(_))
        ));
        assert!(matches!(
            FrequencyGrid::new(0.0, f64::NAN, 0.1),
            Err(PeriodogramError::InvalidGrid(_))
        ));
    }

    #[test]
    fn partitions_cover_grid_in_order() {
        let grid = FrequencyGrid::new(0.0, 1.0, 0.01).unwrap();
        for parts in [1, 2, 3, 5, 7] {
            let pieces = grid.partition(parts);
            assert_eq!(pieces.len(), parts);
            let joined: Vec<f64> = pieces.iter().flat_map(|p| p.frequencies()).collect();
            assert_eq!(joined, grid.frequencies());
            let sizes: Vec<usize> = pieces.iter().map(|p| p.len()).collect();
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            assert!(max - min <= 1);
            assert!(pieces[0].is_leading());
            assert!(pieces.iter().skip(1).all(|p| !p.is_leading()));
        }
    }

    #[test]
    fn partition_never_yields_empty_windows() {
        let grid = FrequencyGrid::new(0.0, 0.2, 0.1).unwrap();
        let pieces = grid.partition(8);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.len() == 1));
    }

    #[test]
    fn with_start_keeps_step_and_stop() {
        let grid = FrequencyGrid::new(0.0, 1.0, 0.1).unwrap();
        let moved = grid.with_start(0.25).unwrap();
        assert_relative_eq!(moved.start(), 0.25);
        assert_relative_eq!(moved.step(), 0.1);
        assert_eq!(moved.len(), grid_len(0.25, 1.0, 0.1));
        assert!(grid.with_start(2.0).is_err());
    }

    #[test]
    fn resolves_defaults_from_series() {
        let ts = uniform_series(101, 0.5);
        let grid = GridSpec::default().resolve(&ts, 0.0).unwrap();
        // T = 50, oversampling 10 => step 0.002; Nyquist = 0.5 / 0.5 = 1
        assert_relative_eq!(grid.step(), 0.002, epsilon = 1e-15);
        assert_relative_eq!(grid.start(), 0.0);
        assert_relative_eq!(grid.stop(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn resolve_keeps_explicit_bounds() {
        let ts = uniform_series(20, 1.0);
        let spec = GridSpec::default().with_start(0.1).with_stop(0.3).with_step(0.05);
        let grid = spec.resolve(&ts, 0.0).unwrap();
        assert_eq!(grid.len(), 5);
        assert_relative_eq!(grid.start(), 0.1);
    }

    #[test]
    fn resolve_uses_estimator_minimum_for_unset_start() {
        let ts = uniform_series(20, 1.0);
        let grid = GridSpec::default().resolve(&ts, 0.2).unwrap();
        assert_relative_eq!(grid.start(), 0.2);
    }

    #[test]
    fn resolve_rejects_inverted_bounds() {
        let ts = uniform_series(20, 1.0);
        let spec = GridSpec::default().with_start(0.4).with_stop(0.3);
        assert!(matches!(
            spec.resolve(&ts, 0.0),
            Err(PeriodogramError::InvalidGrid(_))
        ));
        let spec = GridSpec::default().with_oversampling(0.0);
        assert!(matches!(
            spec.resolve(&ts, 0.0),
            Err(PeriodogramError::InvalidGrid(_))
        ));
    }
}
