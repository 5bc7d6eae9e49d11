//! Estimator-independent spectral tools: the sampling window and output normalization.

mod normalization;
mod window;

pub use normalization::{Normalization, NormalizationScale};
pub use window::{window_function, SpectralWindow};
