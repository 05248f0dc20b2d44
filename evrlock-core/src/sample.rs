//! Per-step lock sample types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sample as captured in the lock log, before any decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSample {
    /// Phase-shifter step index (unit suffix already stripped).
    pub step_index: f64,
    /// Free-running clock counter.
    pub tick_count: i64,
    /// Phase detector A register contents.
    pub phase_raw_a: u64,
    /// Phase detector B register contents.
    pub phase_raw_b: u64,
    /// Reference amplitude the phase readings are normalized by.
    pub norm_divisor: f64,
}

impl RawSample {
    /// Creates a new raw sample.
    #[must_use]
    pub fn new(
        step_index: f64,
        tick_count: i64,
        phase_raw_a: u64,
        phase_raw_b: u64,
        norm_divisor: f64,
    ) -> Self {
        Self {
            step_index,
            tick_count,
            phase_raw_a,
            phase_raw_b,
            norm_divisor,
        }
    }

    /// Returns true if the divisor can be used for normalization.
    ///
    /// Zero and NaN are rejected. An infinite divisor is usable and
    /// normalizes any reading to zero.
    #[must_use]
    pub fn has_valid_divisor(&self) -> bool {
        is_valid_divisor(self.norm_divisor)
    }
}

/// Returns true if `divisor` is neither zero nor NaN.
#[must_use]
pub fn is_valid_divisor(divisor: f64) -> bool {
    divisor != 0.0 && !divisor.is_nan()
}

/// A sample with both phase channels sign-corrected and normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedSample {
    /// Phase-shifter step index.
    pub step_index: f64,
    /// Free-running clock counter.
    pub tick_count: i64,
    /// Dimensionless phase fraction, channel A.
    pub phase_a: f64,
    /// Dimensionless phase fraction, channel B.
    pub phase_b: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisor_validity() {
        assert!(RawSample::new(0.0, 0, 0, 0, 2.0).has_valid_divisor());
        assert!(RawSample::new(0.0, 0, 0, 0, -1.5).has_valid_divisor());
        assert!(!RawSample::new(0.0, 0, 0, 0, 0.0).has_valid_divisor());
        assert!(!RawSample::new(0.0, 0, 0, 0, -0.0).has_valid_divisor());
        assert!(!RawSample::new(0.0, 0, 0, 0, f64::NAN).has_valid_divisor());
        assert!(RawSample::new(0.0, 0, 0, 0, f64::INFINITY).has_valid_divisor());
        assert!(RawSample::new(0.0, 0, 0, 0, f64::NEG_INFINITY).has_valid_divisor());
    }
}
