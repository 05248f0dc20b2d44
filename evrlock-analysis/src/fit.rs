//! Least-squares drift fits over a window of the calibrated series.
//!
//! The fits are a diagnostic: they estimate how fast the phase and the clock
//! counter walk as the phase shifter steps. Early samples are usually still
//! settling, so each channel is fitted over its own index window.
#![allow(clippy::cast_precision_loss)]

use evrlock_core::CalibratedSeries;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of fitting `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Number of points used.
    pub points: usize,
}

impl LinearFit {
    /// Evaluates the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a straight line through paired samples.
///
/// Uses the centered form `slope = cov(x, y) / var(x)`. Returns `None` when
/// there are fewer than two points, the slices differ in length, or all `x`
/// are equal.
#[must_use]
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }
    if sxx == 0.0 || !sxx.is_finite() {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        points: x.len(),
    })
}

/// Half-open index window `[start, end)`; `end = None` runs to the last sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitWindow {
    /// First index included.
    pub start: usize,
    /// First index excluded.
    pub end: Option<usize>,
}

impl FitWindow {
    /// Window covering every sample.
    pub const ALL: Self = Self {
        start: 0,
        end: None,
    };

    /// Creates a window.
    #[must_use]
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Resolves the window against a series of `len` samples.
    ///
    /// Out-of-range bounds are clamped; an inverted window is empty.
    #[must_use]
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let end = self.end.map_or(len, |end| end.min(len));
        let start = self.start.min(end);
        start..end
    }
}

/// Which fits to run and over which windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitConfig {
    /// Fits run only when enabled.
    pub enabled: bool,
    /// Window for the clock drift fit.
    pub clock_drift: FitWindow,
    /// Window for the phase A fit.
    pub phase_a: FitWindow,
    /// Window for the phase B fit.
    pub phase_b: FitWindow,
}

impl FitConfig {
    /// Creates a disabled fit configuration over all samples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables fitting.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Uses the same window for every channel.
    #[must_use]
    pub fn with_window(mut self, window: FitWindow) -> Self {
        self.clock_drift = window;
        self.phase_a = window;
        self.phase_b = window;
        self
    }

    /// Sets the clock drift window.
    #[must_use]
    pub fn with_clock_drift_window(mut self, window: FitWindow) -> Self {
        self.clock_drift = window;
        self
    }

    /// Sets the phase A window.
    #[must_use]
    pub fn with_phase_a_window(mut self, window: FitWindow) -> Self {
        self.phase_a = window;
        self
    }

    /// Sets the phase B window.
    #[must_use]
    pub fn with_phase_b_window(mut self, window: FitWindow) -> Self {
        self.phase_b = window;
        self
    }
}

/// Drift fits of each channel against time.
///
/// A channel is `None` when its window holds too few distinct points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriftFits {
    /// Clock drift (ps) versus time (ps).
    pub clock_drift: Option<LinearFit>,
    /// Phase A (ps) versus time (ps).
    pub phase_a: Option<LinearFit>,
    /// Phase B (ps) versus time (ps).
    pub phase_b: Option<LinearFit>,
}

impl DriftFits {
    /// Fits every channel of `series` over the configured windows.
    #[must_use]
    pub fn compute(series: &CalibratedSeries, config: &FitConfig) -> Self {
        let fit = |window: FitWindow, y: &[f64]| {
            let range = window.resolve(series.len());
            fit_line(&series.time[range.clone()], &y[range])
        };
        Self {
            clock_drift: fit(config.clock_drift, &series.clock_drift),
            phase_a: fit(config.phase_a, &series.phase_a),
            phase_b: fit(config.phase_b, &series.phase_b),
        }
    }
}
