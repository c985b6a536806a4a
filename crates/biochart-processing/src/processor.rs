//! Stateless signal processor operating on channels
//!
//! Every transform reads `channel.raw` and replaces `channel.processed`.
//! When the raw series is too short, or a parameter cannot produce a
//! meaningful filter, the call leaves `processed` untouched.

use crate::features;
use crate::filters::{self, RcCoefficients};
use crate::spectrum::{self, Spectrum};
use biochart_core::{Channel, Sample};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Transform set bound to one sampling rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalProcessor {
    /// Sampling rate in Hz
    pub sample_rate: f64,
}

impl SignalProcessor {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    /// Replace the processed series when the kernel produced output
    fn store(channel: &mut Channel, output: Option<Vec<Sample>>, op: &'static str) {
        match output {
            Some(series) => channel.set_processed(series),
            None => tracing::debug!(
                channel = %channel.id,
                points = channel.raw.len(),
                "{} skipped",
                op
            ),
        }
    }

    fn coefficients(&self, cutoff_hz: f64) -> Option<RcCoefficients> {
        let coefficients = RcCoefficients::new(cutoff_hz, self.sample_rate);
        if coefficients.is_none() {
            tracing::debug!(
                cutoff_hz,
                sample_rate = self.sample_rate,
                "invalid filter parameters"
            );
        }
        coefficients
    }

    /// First difference over time
    pub fn differentiate(&self, channel: &mut Channel) {
        let output = filters::differentiate(&channel.raw, self.sample_rate);
        Self::store(channel, output, "differentiate");
    }

    /// One-pole low-pass at `cutoff_hz`
    pub fn low_pass(&self, channel: &mut Channel, cutoff_hz: f64) {
        let output = self
            .coefficients(cutoff_hz)
            .and_then(|c| filters::low_pass(&channel.raw, c));
        Self::store(channel, output, "low-pass");
    }

    /// One-pole high-pass at `cutoff_hz`
    pub fn high_pass(&self, channel: &mut Channel, cutoff_hz: f64) {
        let output = self
            .coefficients(cutoff_hz)
            .and_then(|c| filters::high_pass(&channel.raw, c));
        Self::store(channel, output, "high-pass");
    }

    /// High-pass at `low_cutoff_hz`, then low-pass at `high_cutoff_hz`
    pub fn band_pass(&self, channel: &mut Channel, low_cutoff_hz: f64, high_cutoff_hz: f64) {
        let output = match (self.coefficients(low_cutoff_hz), self.coefficients(high_cutoff_hz)) {
            (Some(low), Some(high)) => filters::band_pass(&channel.raw, low, high),
            _ => None,
        };
        Self::store(channel, output, "band-pass");
    }

    /// Trailing mean over `window` samples
    pub fn moving_average(&self, channel: &mut Channel, window: usize) {
        let output = filters::moving_average(&channel.raw, window);
        Self::store(channel, output, "moving average");
    }

    /// Magnitude spectrum into `processed`, full spectrum returned
    pub fn spectrum(&self, channel: &mut Channel) -> Option<Spectrum> {
        let result = spectrum::compute_spectrum(&channel.raw, self.sample_rate);
        match &result {
            Some(spectrum) => channel.set_processed(spectrum.magnitudes.clone()),
            None => Self::store(channel, None, "spectrum"),
        }
        result
    }

    /// Magnitude spectrum into `processed`, complex coefficients returned
    pub fn fft(&self, channel: &mut Channel) -> Option<Vec<Complex64>> {
        self.spectrum(channel).map(|s| s.coefficients)
    }

    /// Peak indices of the raw series above `threshold`
    pub fn detect_peaks(&self, channel: &Channel, threshold: f64) -> Vec<usize> {
        features::detect_peaks(&channel.raw, threshold)
    }

    /// Heart rate in beats per minute, 0 when fewer than two peaks
    pub fn heart_rate(&self, channel: &Channel) -> f64 {
        features::heart_rate(&channel.raw)
    }
}
