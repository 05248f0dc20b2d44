//! Phase decoding: sign correction and amplitude normalization.
#![allow(clippy::cast_precision_loss)]

use crate::sample::{is_valid_divisor, DecodedSample, RawSample};
use crate::signed::{to_signed, BitWidth};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decodes raw phase detector readings into dimensionless phase fractions.
///
/// Both channels of a sample go through the same transform: the register
/// contents are sign-extended from `width` bits and divided by the sample's
/// normalization divisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseDecoder {
    width: BitWidth,
}

impl PhaseDecoder {
    /// Creates a decoder for registers of the given width.
    #[must_use]
    pub fn new(width: BitWidth) -> Self {
        Self { width }
    }

    /// Returns the register width this decoder assumes.
    #[must_use]
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Sign-extends and normalizes a single phase reading.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDivisor`] for a zero or NaN divisor.
    pub fn normalize(&self, raw: u64, divisor: f64) -> Result<f64> {
        if !is_valid_divisor(divisor) {
            return Err(Error::InvalidDivisor(divisor));
        }
        Ok(to_signed(raw, self.width) as f64 / divisor)
    }

    /// Decodes both phase channels of a sample.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDivisor`] if the sample cannot be normalized.
    /// Such samples are dropped by callers rather than propagated as NaN.
    pub fn decode(&self, sample: &RawSample) -> Result<DecodedSample> {
        if !sample.has_valid_divisor() {
            return Err(Error::InvalidDivisor(sample.norm_divisor));
        }
        Ok(DecodedSample {
            step_index: sample.step_index,
            tick_count: sample.tick_count,
            phase_a: self.normalize(sample.phase_raw_a, sample.norm_divisor)?,
            phase_b: self.normalize(sample.phase_raw_b, sample.norm_divisor)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_positive() {
        let decoder = PhaseDecoder::default();
        assert_relative_eq!(decoder.normalize(10, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_normalize_negative_register() {
        let decoder = PhaseDecoder::default();
        // -4 in 27-bit two's complement.
        let raw = (1u64 << 27) - 4;
        assert_relative_eq!(decoder.normalize(raw, 8.0).unwrap(), -0.5);
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let decoder = PhaseDecoder::default();
        assert_eq!(decoder.normalize(10, 0.0), Err(Error::InvalidDivisor(0.0)));
        assert!(decoder.normalize(10, f64::NAN).is_err());
    }

    #[test]
    fn test_infinite_divisor_normalizes_to_zero() {
        let decoder = PhaseDecoder::default();
        assert_relative_eq!(decoder.normalize(10, f64::INFINITY).unwrap(), 0.0);

        let sample = RawSample::new(1.0, 10, 4, 8, f64::INFINITY);
        let decoded = decoder.decode(&sample).unwrap();
        assert_relative_eq!(decoded.phase_a, 0.0);
        assert_relative_eq!(decoded.phase_b, 0.0);
    }

    #[test]
    fn test_decode_both_channels() {
        let decoder = PhaseDecoder::new(BitWidth::new(8).unwrap());
        let sample = RawSample::new(12.0, 100, 0xFE, 0x04, 2.0);
        let decoded = decoder.decode(&sample).unwrap();
        assert_relative_eq!(decoded.step_index, 12.0);
        assert_eq!(decoded.tick_count, 100);
        assert_relative_eq!(decoded.phase_a, -1.0);
        assert_relative_eq!(decoded.phase_b, 2.0);
    }

    #[test]
    fn test_decode_zero_divisor() {
        let decoder = PhaseDecoder::default();
        let sample = RawSample::new(13.0, 105, 5, 5, 0.0);
        assert!(matches!(
            decoder.decode(&sample),
            Err(Error::InvalidDivisor(_))
        ));
    }
}
