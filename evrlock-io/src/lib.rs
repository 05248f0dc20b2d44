//! evrlock-io: Sample log input for EVR lock analysis.
//!
//! This crate reads the whitespace-delimited text logs written by the lock
//! monitor and yields raw samples in file order.
//!

mod error;
mod reader;

pub use error::{Error, Field, Result};
pub use reader::{parse_line, ReaderStatistics, SampleLogReader, MIN_SAMPLE_TOKENS};
