//! Line-oriented reader for EVR lock sample logs.
//!
//! The acquisition tool writes one sample per line:
//!
//! ```text
//! <iter>: <clks> <phase> <phaseN> <valid>
//! ```
//!
//! Anything with fewer than five whitespace-separated tokens (blank lines,
//! banners, register dumps) is not a sample and is skipped.

use crate::error::Field;
use crate::{Error, Result};
use evrlock_core::RawSample;
use log::trace;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Minimum number of tokens for a line to carry a sample.
pub const MIN_SAMPLE_TOKENS: usize = 5;

/// Counters collected while reading a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStatistics {
    /// Lines consumed from the source.
    pub lines_read: usize,
    /// Lines skipped as non-sample noise.
    pub lines_skipped: usize,
    /// Samples produced.
    pub samples: usize,
}

/// Streaming reader producing [`RawSample`]s from a text log.
///
/// The iterator stops after the first error: a corrupted capture is not
/// worth reading past.
pub struct SampleLogReader<R> {
    lines: Lines<R>,
    line_number: usize,
    stats: ReaderStatistics,
    failed: bool,
}

impl SampleLogReader<BufReader<File>> {
    /// Opens a sample log file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SampleLogReader<R> {
    /// Wraps any buffered source.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            stats: ReaderStatistics::default(),
            failed: false,
        }
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn statistics(&self) -> ReaderStatistics {
        self.stats
    }
}

impl<R: BufRead> Iterator for SampleLogReader<R> {
    type Item = Result<RawSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            };
            self.line_number += 1;
            self.stats.lines_read += 1;

            match parse_line(&line) {
                Ok(Some(sample)) => {
                    self.stats.samples += 1;
                    return Some(Ok(sample));
                }
                Ok(None) => {
                    trace!("line {}: not a sample, skipped", self.line_number);
                    self.stats.lines_skipped += 1;
                }
                Err((field, token)) => {
                    self.failed = true;
                    return Some(Err(Error::Parse {
                        line: self.line_number,
                        field,
                        token: token.to_string(),
                    }));
                }
            }
        }
    }
}

/// Parses a single log line.
///
/// Returns `Ok(None)` for lines that are not samples, and the failing column
/// and token if a sample line has a malformed number.
pub fn parse_line(line: &str) -> std::result::Result<Option<RawSample>, (Field, &str)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_SAMPLE_TOKENS {
        return Ok(None);
    }

    let step_index = strip_unit(tokens[0])
        .parse::<f64>()
        .map_err(|_| (Field::StepIndex, tokens[0]))?;
    let tick_count = tokens[1]
        .parse::<i64>()
        .map_err(|_| (Field::TickCount, tokens[1]))?;
    let phase_raw_a = parse_register(tokens[2]).ok_or((Field::PhaseA, tokens[2]))?;
    let phase_raw_b = parse_register(tokens[3]).ok_or((Field::PhaseB, tokens[3]))?;
    let norm_divisor = tokens[4]
        .parse::<f64>()
        .map_err(|_| (Field::Divisor, tokens[4]))?;

    Ok(Some(RawSample::new(
        step_index,
        tick_count,
        phase_raw_a,
        phase_raw_b,
        norm_divisor,
    )))
}

/// Strips a trailing unit suffix such as `:` or `ns` from a step token.
fn strip_unit(token: &str) -> &str {
    token.trim_end_matches(|c: char| !(c.is_ascii_digit() || c == '.'))
}

/// Parses register contents as their unsigned bit pattern.
#[allow(clippy::cast_sign_loss)]
fn parse_register(token: &str) -> Option<u64> {
    token
        .parse::<u64>()
        .ok()
        .or_else(|| token.parse::<i64>().ok().map(|value| value as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> Vec<Result<RawSample>> {
        SampleLogReader::new(Cursor::new(text.to_string())).collect()
    }

    #[test]
    fn test_parse_acquisition_line() {
        let sample = parse_line("42: 1193046 134217720 12 64").unwrap().unwrap();
        assert!((sample.step_index - 42.0).abs() < f64::EPSILON);
        assert_eq!(sample.tick_count, 1_193_046);
        assert_eq!(sample.phase_raw_a, 134_217_720);
        assert_eq!(sample.phase_raw_b, 12);
        assert!((sample.norm_divisor - 64.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multi_char_suffix() {
        let sample = parse_line("12ns 100 10 20 2.0").unwrap().unwrap();
        assert!((sample.step_index - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_step_index_without_suffix() {
        let sample = parse_line("125 0 1 2 3").unwrap().unwrap();
        assert!((sample.step_index - 125.0).abs() < f64::EPSILON);
        let sample = parse_line("7.5 0 1 2 3").unwrap().unwrap();
        assert!((sample.step_index - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_infinite_divisor_token() {
        let sample = parse_line("1: 10 4 8 inf").unwrap().unwrap();
        assert!(sample.norm_divisor.is_infinite());
        assert!(sample.has_valid_divisor());
    }

    #[test]
    fn test_token_count_threshold() {
        assert_eq!(parse_line("1: 2 3 4"), Ok(None));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t "), Ok(None));
        assert!(parse_line("1: 2 3 4 5").unwrap().is_some());
        assert!(parse_line("1: 2 3 4 5 extra").unwrap().is_some());
    }

    #[test]
    fn test_negative_register_token() {
        let sample = parse_line("0: 0 -1 5 1").unwrap().unwrap();
        assert_eq!(sample.phase_raw_a, u64::MAX);
    }

    #[test]
    fn test_parse_errors_name_the_field() {
        assert_eq!(parse_line("x: 1 2 3 4"), Err((Field::StepIndex, "x:")));
        assert_eq!(parse_line("1: 1.5 2 3 4"), Err((Field::TickCount, "1.5")));
        assert_eq!(parse_line("1: 1 zz 3 4"), Err((Field::PhaseA, "zz")));
        assert_eq!(parse_line("1: 1 2 3.0 4"), Err((Field::PhaseB, "3.0")));
        assert_eq!(parse_line("1: 1 2 3 four"), Err((Field::Divisor, "four")));
    }

    #[test]
    fn test_reader_skips_noise_and_preserves_order() {
        let text = "-- Iteration 0\n\n0: 10 1 2 4\nready   T\n1: 20 3 4 4\n2: 30 5 6 4\n";
        let samples: Vec<RawSample> = read_all(text).into_iter().map(|r| r.unwrap()).collect();
        let ticks: Vec<i64> = samples.iter().map(|s| s.tick_count).collect();
        assert_eq!(ticks, vec![10, 20, 30]);
    }

    #[test]
    fn test_reader_statistics() {
        let mut reader = SampleLogReader::new(Cursor::new("a b\n0: 1 2 3 4\n\n"));
        let count = reader.by_ref().count();
        assert_eq!(count, 1);
        assert_eq!(
            reader.statistics(),
            ReaderStatistics {
                lines_read: 3,
                lines_skipped: 2,
                samples: 1,
            }
        );
    }

    #[test]
    fn test_reader_stops_after_parse_error() {
        let results = read_all("0: 1 2 3 4\n1: oops 2 3 4\n2: 1 2 3 4\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(Error::Parse { line, field, token }) => {
                assert_eq!(*line, 2);
                assert_eq!(*field, Field::TickCount);
                assert_eq!(token, "oops");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_io_error_and_stops() {
        let bytes = b"0: 1 2 3 4\n\xFF\xFE 1 2 3 4\n2: 1 2 3 4\n".to_vec();
        let mut reader = SampleLogReader::new(Cursor::new(bytes));

        assert!(matches!(reader.next(), Some(Ok(_))));
        match reader.next() {
            Some(Err(Error::Io(err))) => {
                assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
        assert!(reader.next().is_none());
        assert_eq!(reader.statistics().samples, 1);
    }

    #[test]
    fn test_open_missing_file() {
        let result = SampleLogReader::open("/nonexistent/evrlock.dat");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
