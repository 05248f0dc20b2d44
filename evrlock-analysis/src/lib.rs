//! evrlock-analysis: Calibration and diagnostics for EVR lock samples.
//!
//! This crate provides:
//! - **Unit scaling** - steps, clock ticks and phase into picoseconds
//! - **Drift fits** - windowed least-squares lines against time
//! - **Histograms** - automatic bin selection for the phase distribution
//! - **Pipeline** - raw samples to plot-ready sequences in one pass
//!
#![warn(missing_docs)]

mod error;
pub mod fit;
pub mod histogram;
mod pipeline;
pub mod scaling;

pub use error::{Error, Result};
pub use fit::{fit_line, DriftFits, FitConfig, FitWindow, LinearFit};
pub use histogram::Histogram;
pub use pipeline::{
    analyze, try_analyze, AnalysisConfig, LockAnalysis, LockPipeline, PipelineStatistics,
};
pub use scaling::{centered, ScaleFactors, UnitScaler};

// Re-export core types consumers need alongside the pipeline
pub use evrlock_core::{BitWidth, CalibratedSeries, DecodedBatch, RawSample};
