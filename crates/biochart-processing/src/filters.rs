//! Time-domain filter kernels
//!
//! Each kernel reads a sample series and returns a freshly built output
//! series, or `None` when the input is too short for the operation. The
//! kernels never touch a [`Channel`](biochart_core::Channel); the
//! [`SignalProcessor`](crate::SignalProcessor) decides where the output goes.

use biochart_core::Sample;
use std::f64::consts::PI;

/// Minimum series length for differentiation
pub const DIFFERENTIATE_MIN_POINTS: usize = 2;

/// Minimum series length for the one-pole filters
pub const IIR_MIN_POINTS: usize = 3;

/// Smoothing coefficients of a first-order RC section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcCoefficients {
    /// RC time constant in seconds
    pub rc: f64,
    /// Sampling interval in seconds
    pub dt: f64,
}

impl RcCoefficients {
    /// Coefficients for a cutoff frequency at the given sampling rate.
    ///
    /// Returns `None` unless both values are positive and finite.
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Option<Self> {
        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0) {
            return None;
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return None;
        }

        Some(Self {
            rc: 1.0 / (2.0 * PI * cutoff_hz),
            dt: 1.0 / sample_rate,
        })
    }

    /// Low-pass smoothing factor `dt / (RC + dt)`
    pub fn low_pass_alpha(&self) -> f64 {
        self.dt / (self.rc + self.dt)
    }

    /// High-pass smoothing factor `RC / (RC + dt)`
    pub fn high_pass_alpha(&self) -> f64 {
        self.rc / (self.rc + self.dt)
    }
}

/// First difference scaled by the time step.
///
/// The first output point is zero. A repeated timestamp uses `1 / sample_rate`
/// as its time step.
pub fn differentiate(samples: &[Sample], sample_rate: f64) -> Option<Vec<Sample>> {
    let first = samples.first()?;
    if samples.len() < DIFFERENTIATE_MIN_POINTS {
        return None;
    }

    let mut output = Vec::with_capacity(samples.len());
    output.push(Sample::new(first.time, 0.0));

    for pair in samples.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let mut dt = curr.time - prev.time;
        if dt == 0.0 {
            dt = 1.0 / sample_rate;
        }
        output.push(Sample::new(curr.time, (curr.value - prev.value) / dt));
    }

    Some(output)
}

/// One-pole IIR low-pass: `y[i] = y[i-1] + α (x[i] - y[i-1])`
pub fn low_pass(samples: &[Sample], coefficients: RcCoefficients) -> Option<Vec<Sample>> {
    if samples.len() < IIR_MIN_POINTS {
        return None;
    }

    let alpha = coefficients.low_pass_alpha();
    let mut output = Vec::with_capacity(samples.len());
    let mut previous = samples[0].value;
    output.push(samples[0]);

    for sample in &samples[1..] {
        previous += alpha * (sample.value - previous);
        output.push(Sample::new(sample.time, previous));
    }

    Some(output)
}

/// One-pole IIR high-pass: `y[i] = α (y[i-1] + x[i] - x[i-1])`
pub fn high_pass(samples: &[Sample], coefficients: RcCoefficients) -> Option<Vec<Sample>> {
    if samples.len() < IIR_MIN_POINTS {
        return None;
    }

    let alpha = coefficients.high_pass_alpha();
    let mut output = Vec::with_capacity(samples.len());
    let mut previous = samples[0].value;
    output.push(samples[0]);

    for pair in samples.windows(2) {
        previous = alpha * (previous + pair[1].value - pair[0].value);
        output.push(Sample::new(pair[1].time, previous));
    }

    Some(output)
}

/// High-pass at the low cutoff followed by low-pass at the high cutoff
pub fn band_pass(samples: &[Sample], low: RcCoefficients, high: RcCoefficients) -> Option<Vec<Sample>> {
    let intermediate = high_pass(samples, low)?;
    low_pass(&intermediate, high)
}

/// Trailing arithmetic mean over `window` samples.
///
/// The first `window - 1` points are copied unchanged. Requires a non-zero
/// window no longer than the series.
pub fn moving_average(samples: &[Sample], window: usize) -> Option<Vec<Sample>> {
    if window == 0 || samples.len() < window {
        return None;
    }

    let mut output = Vec::with_capacity(samples.len());
    output.extend_from_slice(&samples[..window - 1]);

    let divisor = window as f64;
    for chunk in samples.windows(window) {
        let sum: f64 = chunk.iter().map(|s| s.value).sum();
        let time = chunk[window - 1].time;
        output.push(Sample::new(time, sum / divisor));
    }

    Some(output)
}
