//! Analysis error types.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Analysis error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Scale factor that would poison every output value.
    #[error("invalid scale factor {name}: {value}")]
    InvalidScale {
        /// Name of the factor.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}
