//! One-dimensional histograms with automatic bin selection.
//!
//! The phase distribution is plotted without a hand-picked bin count. Bin
//! width follows the usual "auto" rule: the smaller of the Sturges and
//! Freedman-Diaconis widths, falling back to Sturges when the interquartile
//! range is zero. A handful of extreme outliers can make the
//! Freedman-Diaconis count explode, so it is capped at [`MAX_AUTO_BINS`] and
//! the Sturges count is used beyond that.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest bin count [`Histogram::auto`] will pick.
pub const MAX_AUTO_BINS: usize = 10_000;

/// Histogram with `counts.len() + 1` monotonically increasing edges.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    /// Bin edges; bin `i` covers `[edges[i], edges[i + 1])`, the last bin is closed.
    pub edges: Vec<f64>,
    /// Number of values in each bin.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bins `values` with an automatically chosen bin count.
    ///
    /// Non-finite values are ignored. An input with no finite values gives an
    /// empty histogram.
    #[must_use]
    pub fn auto(values: &[f64]) -> Self {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }
        finite.sort_by(f64::total_cmp);

        let n_bins = auto_bin_count(&finite);
        Self::from_sorted(&finite, n_bins)
    }

    /// Bins `values` into `n_bins` equal-width bins spanning their range.
    #[must_use]
    pub fn with_bins(values: &[f64], n_bins: usize) -> Self {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || n_bins == 0 {
            return Self::default();
        }
        finite.sort_by(f64::total_cmp);
        Self::from_sorted(&finite, n_bins)
    }

    fn from_sorted(sorted: &[f64], n_bins: usize) -> Self {
        let (mut lo, mut hi) = (sorted[0], sorted[sorted.len() - 1]);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let bin_width = (hi - lo) / n_bins as f64;

        let edges = (0..=n_bins)
            .map(|i| if i == n_bins { hi } else { lo + bin_width * i as f64 })
            .collect();

        let mut counts = vec![0u64; n_bins];
        for &v in sorted {
            let bin = ((v - lo) / bin_width) as usize;
            counts[bin.min(n_bins - 1)] += 1;
        }

        Self { edges, counts }
    }

    /// Returns the number of bins.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Returns the total number of binned values.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Returns true if nothing was binned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the center of each bin.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

/// Picks a bin count for sorted, finite, non-empty data.
fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    if range == 0.0 {
        return 1;
    }

    let sturges_bins = (n.log2() + 1.0).ceil();
    let iqr = percentile(sorted, 75.0) - percentile(sorted, 25.0);
    let fd = 2.0 * iqr / n.cbrt();
    let fd_bins = if fd > 0.0 { (range / fd).ceil() } else { 0.0 };

    // Compared as floats: the FD count can exceed usize::MAX or be NaN.
    let bins = if fd_bins > sturges_bins && fd_bins <= MAX_AUTO_BINS as f64 {
        fd_bins
    } else {
        sturges_bins
    };
    (bins as usize).clamp(1, MAX_AUTO_BINS)
}

/// Linear-interpolated percentile of sorted data.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_and_non_finite() {
        assert!(Histogram::auto(&[]).is_empty());
        assert!(Histogram::auto(&[f64::NAN, f64::INFINITY]).is_empty());
        assert!(Histogram::with_bins(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_constant_input_single_bin() {
        let hist = Histogram::auto(&[0.25; 7]);
        assert_eq!(hist.counts, vec![7]);
        assert_relative_eq!(hist.edges[0], -0.25);
        assert_relative_eq!(hist.edges[1], 0.75);
    }

    #[test]
    fn test_fixed_bins() {
        let hist = Histogram::with_bins(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        // Maximum lands in the closed last bin.
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
        assert_eq!(hist.centers(), vec![0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_auto_uses_sturges_for_small_uniform_data() {
        // n = 8, range = 7: Sturges width 7/4, FD width 2*3.5/2 = 3.5.
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        let hist = Histogram::auto(&values);
        assert_eq!(hist.n_bins(), 4);
        assert_eq!(hist.total(), 8);
    }

    #[test]
    fn test_auto_uses_fd_when_narrower() {
        // A tight core with a few far outliers makes the IQR small.
        let mut values = vec![0.0; 200];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i % 10) as f64 * 0.01;
        }
        values.push(100.0);
        let hist = Histogram::auto(&values);
        // Sturges alone would give ceil(log2(201) + 1) = 9 bins.
        assert!(hist.n_bins() > 9);
        assert_eq!(hist.total(), 201);
    }

    #[test]
    fn test_auto_caps_bins_for_extreme_outlier() {
        // One sample normalized by a tiny divisor dwarfs the rest.
        let mut values: Vec<f64> = (0..100).map(|i| f64::from(i % 10)).collect();
        values.push(5.0e300);
        let hist = Histogram::auto(&values);
        // Falls back to Sturges: ceil(log2(101) + 1) = 8.
        assert_eq!(hist.n_bins(), 8);
        assert_eq!(hist.edges.len(), 9);
        assert_eq!(hist.total(), 101);
    }

    #[test]
    fn test_auto_never_exceeds_max_bins() {
        let mut values = vec![0.0; 1000];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i % 2) as f64 * 1e-6;
        }
        values.push(1.0);
        let hist = Histogram::auto(&values);
        assert!(hist.n_bins() <= MAX_AUTO_BINS);
        assert_eq!(hist.total(), 1001);
    }

    #[test]
    fn test_percentile() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&sorted, 25.0), 1.75);
        assert_relative_eq!(percentile(&sorted, 75.0), 3.25);
        assert_relative_eq!(percentile(&sorted, 50.0), 2.5);
    }
}
