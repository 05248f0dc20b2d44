//! Conversion of decoded samples into picoseconds.
#![allow(clippy::cast_precision_loss)]

use crate::{Error, Result};
use evrlock_core::{CalibratedSeries, DecodedBatch, DecodedSample};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Calibration constants for the lock measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleFactors {
    /// Picoseconds per phase-shifter step.
    pub ps_per_step: f64,
    /// Picoseconds per clock counter tick.
    pub ps_per_clock: f64,
    /// Picoseconds per unit of normalized phase (both channels).
    pub ps_per_phase: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            ps_per_step: 15.0,
            ps_per_clock: 8.4e-3,
            ps_per_phase: 7.0e6,
        }
    }
}

impl ScaleFactors {
    /// Creates scale factors with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets picoseconds per step.
    #[must_use]
    pub fn with_ps_per_step(mut self, value: f64) -> Self {
        self.ps_per_step = value;
        self
    }

    /// Sets picoseconds per clock tick.
    #[must_use]
    pub fn with_ps_per_clock(mut self, value: f64) -> Self {
        self.ps_per_clock = value;
        self
    }

    /// Sets picoseconds per unit phase.
    #[must_use]
    pub fn with_ps_per_phase(mut self, value: f64) -> Self {
        self.ps_per_phase = value;
        self
    }

    /// Checks that every factor is finite.
    ///
    /// # Errors
    /// Returns [`Error::InvalidScale`] naming the first non-finite factor.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("ps_per_step", self.ps_per_step),
            ("ps_per_clock", self.ps_per_clock),
            ("ps_per_phase", self.ps_per_phase),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidScale { name, value });
            }
        }
        Ok(())
    }
}

/// Element-wise linear rescaling into physical units.
///
/// No state is carried between samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitScaler {
    factors: ScaleFactors,
}

impl UnitScaler {
    /// Creates a scaler, validating the factors.
    ///
    /// # Errors
    /// Returns [`Error::InvalidScale`] if any factor is not finite.
    pub fn new(factors: ScaleFactors) -> Result<Self> {
        factors.validate()?;
        Ok(Self { factors })
    }

    /// Returns the scale factors in use.
    #[must_use]
    pub fn factors(&self) -> ScaleFactors {
        self.factors
    }

    /// Scales one sample and appends it to `series`.
    pub fn push_scaled(&self, series: &mut CalibratedSeries, sample: &DecodedSample) {
        let f = &self.factors;
        series.push(
            sample.step_index * f.ps_per_step,
            sample.phase_a * f.ps_per_phase,
            sample.phase_b * f.ps_per_phase,
            sample.tick_count as f64 * f.ps_per_clock,
        );
    }

    /// Scales a whole batch.
    #[must_use]
    pub fn scale(&self, batch: &DecodedBatch) -> CalibratedSeries {
        let mut series = CalibratedSeries::with_capacity(batch.len());
        for sample in batch.iter() {
            self.push_scaled(&mut series, &sample);
        }
        series
    }
}

/// Returns `values` with their mean subtracted.
///
/// Lock drift plots show phase relative to its average; an empty slice gives
/// an empty result.
#[must_use]
pub fn centered(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| v - mean).collect()
}
