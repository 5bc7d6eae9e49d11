//! Injectable diagnostics for periodogram runs.
//!
//! Each [`estimate`](crate::dispatch::estimate) call reports what it did to
//! the sink in its [`PeriodogramConfig`](crate::dispatch::PeriodogramConfig).
//! The default [`TracingSink`] forwards events to `tracing` at debug level;
//! subscriber setup is left to the application.

use std::fmt::Debug;

use tracing::{debug, warn};

/// Something worth reporting during a periodogram run.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// The frequency grid after filling unset bounds.
    GridResolved {
        estimator: &'static str,
        start: f64,
        stop: f64,
        step: f64,
        len: usize,
    },
    /// The estimator replaced the resolved grid.
    GridAdjusted {
        estimator: &'static str,
        start: f64,
        stop: f64,
        len: usize,
    },
    /// The grid was split for parallel execution.
    Partitioned { parts: usize, threads: usize },
    /// One partition completed successfully.
    PartitionFinished { index: usize, len: usize },
    /// A thread count above one was ignored for a non-partitionable estimator.
    PartitioningIgnored {
        estimator: &'static str,
        threads: usize,
    },
}

/// Receiver of [`DiagnosticEvent`]s.
///
/// Sinks are shared by worker threads and must be thread-safe.
pub trait DiagnosticsSink: Send + Sync + Debug {
    fn record(&self, event: &DiagnosticEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        match *event {
            DiagnosticEvent::GridResolved {
                estimator,
                start,
                stop,
                step,
                len,
            } => debug!(estimator, start, stop, step, len, "Resolved frequency grid"),
            DiagnosticEvent::GridAdjusted {
                estimator,
                start,
                stop,
                len,
            } => debug!(estimator, start, stop, len, "Estimator adjusted frequency grid"),
            DiagnosticEvent::Partitioned { parts, threads } => {
                debug!(parts, threads, "Partitioned frequency grid")
            }
            DiagnosticEvent::PartitionFinished { index, len } => {
                debug!(index, len, "Partition finished")
            }
            DiagnosticEvent::PartitioningIgnored { estimator, threads } => warn!(
                estimator,
                threads, "Estimator is not partitionable, running as a single unit"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}
