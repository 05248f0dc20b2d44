//! I/O error types.

use std::fmt;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Column of a sample line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Step index (first column).
    StepIndex,
    /// Clock tick count (second column).
    TickCount,
    /// Phase detector A (third column).
    PhaseA,
    /// Phase detector B (fourth column).
    PhaseB,
    /// Normalization divisor (fifth column).
    Divisor,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::StepIndex => "step index",
            Field::TickCount => "tick count",
            Field::PhaseA => "phase A",
            Field::PhaseB => "phase B",
            Field::Divisor => "divisor",
        };
        f.write_str(name)
    }
}

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Numeric token that does not parse on an otherwise valid sample line.
    #[error("line {line}: cannot parse {field} from {token:?}")]
    Parse {
        /// 1-based line number in the log.
        line: usize,
        /// Column that failed.
        field: Field,
        /// Offending token.
        token: String,
    },
}
