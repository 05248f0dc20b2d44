//! Structure of Arrays (`SoA`) containers for decoded and calibrated samples.
//!
//! Downstream consumers (fits, histograms, plotting) want whole columns, so
//! samples are stored in parallel vectors rather than as a `Vec` of structs.
//! Every column of a container always has the same length.

use crate::sample::DecodedSample;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoded samples in column form, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedBatch {
    /// Phase-shifter step indices.
    pub step_index: Vec<f64>,
    /// Clock counter values.
    pub tick_count: Vec<i64>,
    /// Dimensionless phase, channel A.
    pub phase_a: Vec<f64>,
    /// Dimensionless phase, channel B.
    pub phase_b: Vec<f64>,
}

impl DecodedBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            step_index: Vec::with_capacity(capacity),
            tick_count: Vec::with_capacity(capacity),
            phase_a: Vec::with_capacity(capacity),
            phase_b: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of samples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.step_index.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.step_index.is_empty()
    }

    /// Appends a decoded sample.
    pub fn push(&mut self, sample: DecodedSample) {
        self.step_index.push(sample.step_index);
        self.tick_count.push(sample.tick_count);
        self.phase_a.push(sample.phase_a);
        self.phase_b.push(sample.phase_b);
    }

    /// Returns the sample at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<DecodedSample> {
        Some(DecodedSample {
            step_index: *self.step_index.get(index)?,
            tick_count: self.tick_count[index],
            phase_a: self.phase_a[index],
            phase_b: self.phase_b[index],
        })
    }

    /// Iterates over the samples in order.
    pub fn iter(&self) -> impl Iterator<Item = DecodedSample> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

impl FromIterator<DecodedSample> for DecodedBatch {
    fn from_iter<I: IntoIterator<Item = DecodedSample>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut batch = Self::with_capacity(iter.size_hint().0);
        for sample in iter {
            batch.push(sample);
        }
        batch
    }
}

/// Physical-unit sequences ready for plotting.
///
/// Element `i` of every column corresponds to decoded sample `i`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibratedSeries {
    /// Phase-shifter position in picoseconds.
    pub time: Vec<f64>,
    /// Phase A in picoseconds.
    pub phase_a: Vec<f64>,
    /// Phase B in picoseconds.
    pub phase_b: Vec<f64>,
    /// Clock counter in picoseconds.
    pub clock_drift: Vec<f64>,
}

impl CalibratedSeries {
    /// Creates a new empty series with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            phase_a: Vec::with_capacity(capacity),
            phase_b: Vec::with_capacity(capacity),
            clock_drift: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Returns true if the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Appends one calibrated point.
    pub fn push(&mut self, time: f64, phase_a: f64, phase_b: f64, clock_drift: f64) {
        self.time.push(time);
        self.phase_a.push(phase_a);
        self.phase_b.push(phase_b);
        self.clock_drift.push(clock_drift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(step: f64) -> DecodedSample {
        DecodedSample {
            step_index: step,
            tick_count: 7,
            phase_a: 0.25,
            phase_b: -0.5,
        }
    }

    #[test]
    fn test_decoded_batch_operations() {
        let mut batch = DecodedBatch::with_capacity(4);
        assert!(batch.is_empty());

        batch.push(sample(1.0));
        batch.push(sample(2.0));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(1), Some(sample(2.0)));
        assert_eq!(batch.get(2), None);

        let steps: Vec<f64> = batch.iter().map(|s| s.step_index).collect();
        assert_eq!(steps, vec![1.0, 2.0]);
    }

    #[test]
    fn test_decoded_batch_from_iter() {
        let batch: DecodedBatch = (0..5).map(|i| sample(f64::from(i))).collect();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.tick_count.len(), 5);
        assert_eq!(batch.phase_b.len(), 5);
    }

    #[test]
    fn test_calibrated_series_push() {
        let mut series = CalibratedSeries::with_capacity(1);
        series.push(180.0, 5.0, 10.0, 100.0);
        assert_eq!(series.len(), 1);
        assert_eq!(series.clock_drift, vec![100.0]);
        assert_eq!(series.phase_b, vec![10.0]);
    }
}
