//! Two's-complement reinterpretation of fixed-width register values.
//!
//! Phase detector registers on the EVR are narrower than any host integer
//! type. A value read back as an unsigned word has to be sign-extended from
//! the register width, not from 32 or 64 bits.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width in bits of a two's-complement hardware register.
///
/// Always in `1..=64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct BitWidth(u32);

impl BitWidth {
    /// Width of the EVR phase detector registers.
    pub const PHASE_DETECTOR: Self = Self(27);

    /// Creates a bit width, rejecting zero and anything above 64.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBitWidth`] if `bits` is outside `1..=64`.
    pub fn new(bits: u32) -> Result<Self> {
        if (1..=64).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(Error::InvalidBitWidth(bits))
        }
    }

    /// Returns the width in bits.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mask covering the low `bits` bits.
    #[must_use]
    pub fn mask(self) -> u64 {
        u64::MAX >> (64 - self.0)
    }

    /// Mask selecting the sign bit.
    #[must_use]
    pub fn sign_bit(self) -> u64 {
        1 << (self.0 - 1)
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        Self::PHASE_DETECTOR
    }
}

impl TryFrom<u32> for BitWidth {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        Self::new(bits)
    }
}

impl From<BitWidth> for u32 {
    fn from(width: BitWidth) -> Self {
        width.0
    }
}

/// Reinterprets a `width`-bit register value as signed.
///
/// If bit `width - 1` is set the result is `raw - 2^width`, otherwise `raw`
/// unchanged. Values wider than the register are not truncated; the
/// subtraction is exact for `raw < 2^63` and wraps modulo `2^64` beyond.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn to_signed(raw: u64, width: BitWidth) -> i64 {
    if raw & width.sign_bit() == 0 {
        raw as i64
    } else {
        // 2^width wraps to 0 for a 64-bit register.
        raw.wrapping_sub(width.mask().wrapping_add(1)) as i64
    }
}

/// Re-encodes a signed value as the unsigned contents of a `width`-bit register.
///
/// Inverse of [`to_signed`] for values in `[-2^(width-1), 2^(width-1))`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn from_signed(value: i64, width: BitWidth) -> u64 {
    (value as u64) & width.mask()
}
