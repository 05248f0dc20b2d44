//! Error types for evrlock-core.

use thiserror::Error;

/// Result type alias for evrlock operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for decoding lock samples.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Register width outside the supported `1..=64` range.
    #[error("invalid register bit width: {0} (expected 1..=64)")]
    InvalidBitWidth(u32),

    /// Normalization divisor that cannot be divided by.
    #[error("invalid normalization divisor: {0}")]
    InvalidDivisor(f64),
}
