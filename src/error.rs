//! Error types for the anofox-periodogram library.

use thiserror::Error;

/// Result type alias for periodogram operations.
pub type Result<T> = std::result::Result<T, PeriodogramError>;

/// Errors that can occur while computing periodograms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodogramError {
    /// The frequency grid is empty or malformed.
    #[error("invalid frequency grid: {0}")]
    InvalidGrid(String),

    /// The input series cannot support the requested statistic.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The per-frequency design matrix is singular.
    #[error("singular design matrix at frequency {frequency}")]
    NumericalDegeneracy { frequency: f64 },

    /// A parallel partition failed; results of the other partitions are discarded.
    #[error("partition {index} failed: {source}")]
    PartitionFailure {
        index: usize,
        #[source]
        source: Box<PeriodogramError>,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between input arrays.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Computation error (e.g. worker pool construction).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl PeriodogramError {
    /// Unwrap a partition failure down to the error raised inside the worker.
    pub fn root_cause(&self) -> &PeriodogramError {
        match self {
            PeriodogramError::PartitionFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = PeriodogramError::InvalidGrid("stop must exceed start".to_string());
        assert_eq!(
            err.to_string(),
            "invalid frequency grid: stop must exceed start"
        );

        let err = PeriodogramError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2, got 1");

        let err = PeriodogramError::NumericalDegeneracy { frequency: 0.5 };
        assert_eq!(err.to_string(), "singular design matrix at frequency 0.5");

        let err = PeriodogramError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");
    }

    #[test]
    fn partition_failure_reports_index_and_cause() {
        let err = PeriodogramError::PartitionFailure {
            index: 2,
            source: Box::new(PeriodogramError::NumericalDegeneracy { frequency: 1.0 }),
        };
        assert_eq!(
            err.to_string(),
            "partition 2 failed: singular design matrix at frequency 1"
        );
        assert_eq!(
            err.root_cause(),
            &PeriodogramError::NumericalDegeneracy { frequency: 1.0 }
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = PeriodogramError::DegenerateInput("zero variance".into());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
