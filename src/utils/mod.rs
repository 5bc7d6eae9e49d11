//! Utility functions shared by the estimators.

pub mod stats;

pub use stats::{frac, mean, median, population_variance, weighted_mean, weighted_variance};
