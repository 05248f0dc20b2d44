//! End-to-end processing: raw samples to calibrated, plot-ready sequences.

use crate::fit::{DriftFits, FitConfig};
use crate::histogram::Histogram;
use crate::scaling::{centered, ScaleFactors, UnitScaler};
use crate::{Error, Result};
use evrlock_core::{BitWidth, CalibratedSeries, DecodedBatch, PhaseDecoder, RawSample};
use log::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a lock analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Width of the phase detector registers.
    pub bit_width: BitWidth,
    /// Calibration constants.
    pub scale: ScaleFactors,
    /// Optional drift fits.
    pub fit: FitConfig,
}

impl AnalysisConfig {
    /// Creates a configuration with EVR defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the register width.
    #[must_use]
    pub fn with_bit_width(mut self, width: BitWidth) -> Self {
        self.bit_width = width;
        self
    }

    /// Sets the scale factors.
    #[must_use]
    pub fn with_scale(mut self, scale: ScaleFactors) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the fit configuration.
    #[must_use]
    pub fn with_fit(mut self, fit: FitConfig) -> Self {
        self.fit = fit;
        self
    }
}

/// Counters for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineStatistics {
    /// Raw samples received.
    pub samples_in: usize,
    /// Samples dropped for an unusable divisor.
    pub samples_dropped: usize,
    /// Samples that made it into the output.
    pub samples_out: usize,
}

/// Output of a lock analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LockAnalysis {
    /// Decoded, dimensionless samples.
    pub decoded: DecodedBatch,
    /// Samples in picoseconds.
    pub series: CalibratedSeries,
    /// Drift fits, when enabled.
    pub fits: Option<DriftFits>,
    /// Run counters.
    pub statistics: PipelineStatistics,
}

impl LockAnalysis {
    /// Histogram of the dimensionless phase A readings.
    #[must_use]
    pub fn phase_histogram(&self) -> Histogram {
        Histogram::auto(&self.decoded.phase_a)
    }

    /// Phase A in picoseconds relative to its mean.
    #[must_use]
    pub fn centered_phase_a(&self) -> Vec<f64> {
        centered(&self.series.phase_a)
    }

    /// Phase B in picoseconds relative to its mean.
    #[must_use]
    pub fn centered_phase_b(&self) -> Vec<f64> {
        centered(&self.series.phase_b)
    }
}

/// Incremental decode-and-scale state.
///
/// Samples are pushed in input order; invalid ones are dropped without
/// disturbing their neighbours.
#[derive(Debug, Clone)]
pub struct LockPipeline {
    decoder: PhaseDecoder,
    scaler: UnitScaler,
    fit: FitConfig,
    decoded: DecodedBatch,
    series: CalibratedSeries,
    stats: PipelineStatistics,
}

impl LockPipeline {
    /// Creates a pipeline.
    ///
    /// # Errors
    /// Returns an error if the scale factors are invalid.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            decoder: PhaseDecoder::new(config.bit_width),
            scaler: UnitScaler::new(config.scale)?,
            fit: config.fit,
            decoded: DecodedBatch::default(),
            series: CalibratedSeries::default(),
            stats: PipelineStatistics::default(),
        })
    }

    /// Decodes and scales one sample. Returns false if it was dropped.
    pub fn push(&mut self, sample: &RawSample) -> bool {
        self.stats.samples_in += 1;
        match self.decoder.decode(sample) {
            Ok(decoded) => {
                self.scaler.push_scaled(&mut self.series, &decoded);
                self.decoded.push(decoded);
                self.stats.samples_out += 1;
                true
            }
            Err(err) => {
                debug!("dropping sample at step {}: {err}", sample.step_index);
                self.stats.samples_dropped += 1;
                false
            }
        }
    }

    /// Returns the counters so far.
    #[must_use]
    pub fn statistics(&self) -> PipelineStatistics {
        self.stats
    }

    /// Finishes the run, computing fits if enabled.
    #[must_use]
    pub fn finish(self) -> LockAnalysis {
        let fits = self.fit.enabled.then(|| {
            let fits = DriftFits::compute(&self.series, &self.fit);
            if fits.clock_drift.is_none() || fits.phase_a.is_none() || fits.phase_b.is_none() {
                warn!("drift fit window holds too few distinct points for some channels");
            }
            fits
        });

        info!(
            "decoded {} of {} samples ({} dropped)",
            self.stats.samples_out, self.stats.samples_in, self.stats.samples_dropped
        );

        LockAnalysis {
            decoded: self.decoded,
            series: self.series,
            fits,
            statistics: self.stats,
        }
    }
}

/// Runs the full pipeline over already-parsed samples.
///
/// # Errors
/// Returns an error if the configuration is invalid.
pub fn analyze<I>(samples: I, config: &AnalysisConfig) -> Result<LockAnalysis>
where
    I: IntoIterator<Item = RawSample>,
{
    let mut pipeline = LockPipeline::new(config)?;
    for sample in samples {
        pipeline.push(&sample);
    }
    Ok(pipeline.finish())
}

/// Runs the full pipeline over a fallible sample stream, such as a log reader.
///
/// The first error from the stream aborts the run; no partial output is
/// returned.
///
/// # Errors
/// Returns the stream's first error, or a configuration error.
pub fn try_analyze<I, E>(samples: I, config: &AnalysisConfig) -> std::result::Result<LockAnalysis, E>
where
    I: IntoIterator<Item = std::result::Result<RawSample, E>>,
    E: From<Error>,
{
    let mut pipeline = LockPipeline::new(config)?;
    for sample in samples {
        pipeline.push(&sample?);
    }
    Ok(pipeline.finish())
}
