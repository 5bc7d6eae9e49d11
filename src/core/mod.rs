//! Core data structures: time series, frequency grids and periodograms.

mod grid;
mod periodogram;
mod time_series;

pub use grid::{grid_len, FrequencyGrid, GridSpec, DEFAULT_OVERSAMPLING};
pub use periodogram::Periodogram;
pub use time_series::{TimeSeries, TimeSeriesBuilder};
