//! Running estimators over a resolved, optionally partitioned, frequency grid.

use std::sync::Arc;

use rayon::prelude::*;

use crate::core::{FrequencyGrid, GridSpec, Periodogram, TimeSeries};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink, TracingSink};
use crate::error::{PeriodogramError, Result};
use crate::estimators::Estimator;

/// Settings shared by every estimator run.
#[derive(Debug, Clone)]
pub struct PeriodogramConfig {
    /// Requested grid bounds; unset bounds derive from the series.
    pub grid: GridSpec,
    /// Number of worker threads; `0` and `1` both run on the calling thread.
    pub threads: usize,
    /// Where run diagnostics are reported.
    pub diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Default for PeriodogramConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            threads: 1,
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl PeriodogramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }
}

/// Compute `estimator` over the grid described by `config`.
///
/// Validation and grid resolution happen before any computation, so invalid
/// parameters and degenerate inputs fail fast. Partitionable estimators run
/// on `config.threads` disjoint windows of the grid and their results are
/// concatenated in frequency order; the output equals a single-threaded run.
///
/// # Example
/// ```
/// use anofox_periodogram::prelude::*;
///
/// let times: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
/// let values: Vec<f64> = times
///     .iter()
///     .map(|t| (2.0 * std::f64::consts::PI * 0.1 * t).sin())
///     .collect();
/// let series = TimeSeries::new(times, values).unwrap();
///
/// let config = PeriodogramConfig::new()
///     .with_grid(GridSpec::new(0.0, 0.5, 0.001))
///     .with_threads(4);
/// let periodogram = estimate(&Scargle::default(), &series, &config).unwrap();
/// let (freq, _) = periodogram.peak().unwrap();
/// assert!((freq - 0.1).abs() < 0.002);
/// ```
pub fn estimate<E: Estimator + ?Sized>(
    estimator: &E,
    series: &TimeSeries,
    config: &PeriodogramConfig,
) -> Result<Periodogram> {
    let sink = config.diagnostics.as_ref();
    estimator.validate(series)?;

    let resolved = config.grid.resolve(series, estimator.min_frequency(series))?;
    sink.record(&DiagnosticEvent::GridResolved {
        estimator: estimator.name(),
        start: resolved.start(),
        stop: resolved.stop(),
        step: resolved.step(),
        len: resolved.len(),
    });

    let grid = estimator.effective_grid(series, resolved)?;
    if grid != resolved {
        sink.record(&DiagnosticEvent::GridAdjusted {
            estimator: estimator.name(),
            start: grid.start(),
            stop: grid.stop(),
            len: grid.len(),
        });
    }

    let threads = if estimator.partitionable() {
        config.threads
    } else {
        if config.threads > 1 {
            sink.record(&DiagnosticEvent::PartitioningIgnored {
                estimator: estimator.name(),
                threads: config.threads,
            });
        }
        1
    };

    let statistic = run_partitioned(&grid, threads, sink, |part| {
        estimator.compute(series, part)
    })?;
    Periodogram::new(grid.frequencies(), statistic, estimator.name())
}

/// Run `compute` over `threads` contiguous windows of `grid` and concatenate the results.
///
/// With `threads <= 1` the closure runs once on the full grid. Otherwise a
/// dedicated thread pool evaluates the windows; if any fails, the error of the
/// lowest-indexed failing window is returned as
/// [`PeriodogramError::PartitionFailure`] and all partial results are dropped.
pub fn run_partitioned<F>(
    grid: &FrequencyGrid,
    threads: usize,
    sink: &dyn DiagnosticsSink,
    compute: F,
) -> Result<Vec<f64>>
where
    F: Fn(&FrequencyGrid) -> Result<Vec<f64>> + Sync,
{
    if threads <= 1 {
        return compute(grid);
    }

    let parts = grid.partition(threads);
    sink.record(&DiagnosticEvent::Partitioned {
        parts: parts.len(),
        threads,
    });

    // never more workers than partitions
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parts.len())
        .build()
        .map_err(|e| PeriodogramError::ComputationError(format!("failed to build thread pool: {e}")))?;
    let results: Vec<Result<Vec<f64>>> = pool.install(|| parts.par_iter().map(&compute).collect());

    let mut statistic = Vec::with_capacity(grid.len());
    for (index, (part, result)) in parts.iter().zip(results).enumerate() {
        let values = result.map_err(|source| PeriodogramError::PartitionFailure {
            index,
            source: Box::new(source),
        })?;
        if values.len() != part.len() {
            return Err(PeriodogramError::PartitionFailure {
                index,
                source: Box::new(PeriodogramError::DimensionMismatch {
                    expected: part.len(),
                    got: values.len(),
                }),
            });
        }
        sink.record(&DiagnosticEvent::PartitionFinished {
            index,
            len: values.len(),
        });
        statistic.extend(values);
    }
    Ok(statistic)
}
