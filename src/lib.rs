//! # anofox-periodogram
//!
//! Periodograms for irregularly sampled time series.
//!
//! Provides classical, generalised and weighted Lomb-Scargle periodograms,
//! Fourier spectra (Deeming, DFT, FFT), CLEAN deconvolution, multi-harmonic
//! analysis of variance, phase dispersion minimization, box least squares and
//! a Keplerian periodogram. Every estimator runs through one entry point,
//! [`estimate`], which resolves the frequency grid and can split it across
//! worker threads without changing the result.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod estimators;
pub mod spectral;
pub mod utils;

pub use dispatch::{estimate, run_partitioned, PeriodogramConfig};
pub use error::{PeriodogramError, Result};
pub use estimators::{Estimator, SingularPolicy};

pub mod prelude {
    pub use crate::core::{FrequencyGrid, GridSpec, Periodogram, TimeSeries};
    pub use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink, NullSink, TracingSink};
    pub use crate::dispatch::{estimate, PeriodogramConfig};
    pub use crate::error::{PeriodogramError, Result};
    pub use crate::estimators::{
        Bls, Clean, Deeming, DftPower, Estimator, FftSpectrum, Gls, Kepler, MultiHarmonicAov, Pdm,
        Scargle, SingularPolicy, WeightedSineFit,
    };
    pub use crate::spectral::{window_function, Normalization, SpectralWindow};
}
