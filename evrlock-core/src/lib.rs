//! evrlock-core: Core types and decoding for EVR timing-lock samples.
//!
//! This crate provides the sample data model, fixed-width two's-complement
//! reinterpretation, and the phase decoder that turns raw register readings
//! into normalized phase fractions.
//!

pub mod decoder;
pub mod error;
pub mod sample;
pub mod signed;
pub mod soa;

pub use decoder::PhaseDecoder;
pub use error::{Error, Result};
pub use sample::{is_valid_divisor, DecodedSample, RawSample};
pub use signed::{from_signed, to_signed, BitWidth};
pub use soa::{CalibratedSeries, DecodedBatch};
