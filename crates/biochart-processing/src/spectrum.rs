//! Hann-windowed magnitude spectrum

use biochart_core::Sample;
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Minimum series length for a spectrum
pub const SPECTRUM_MIN_POINTS: usize = 2;

/// Result of a spectral transform
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// `(frequency, magnitude)` for the lower half of the padded length
    pub magnitudes: Vec<Sample>,
    /// Full complex DFT of the windowed, padded input
    pub coefficients: Vec<Complex64>,
}

impl Spectrum {
    /// Padded transform length
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Frequency of the largest non-DC magnitude
    pub fn dominant_frequency(&self) -> Option<f64> {
        self.magnitudes
            .iter()
            .skip(1)
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .map(|s| s.time)
    }
}

/// Hann coefficient for position `i` of an `n`-point window
pub fn hann(i: usize, n: usize) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1) as f64).cos())
}

/// Zero-pad to the next power of two, apply a Hann window and transform.
///
/// Magnitudes are normalised by the padded length and doubled for every bin
/// except DC. Returns `None` for fewer than two samples.
pub fn compute_spectrum(samples: &[Sample], sample_rate: f64) -> Option<Spectrum> {
    if samples.len() < SPECTRUM_MIN_POINTS {
        return None;
    }

    let n = samples.len().next_power_of_two();
    let mut buffer: Vec<Complex64> = (0..n)
        .map(|i| {
            let value = samples.get(i).map_or(0.0, |s| s.value);
            Complex64::new(value * hann(i, n), 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let resolution = sample_rate / n as f64;
    let scale = n as f64;
    let magnitudes = buffer[..n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut magnitude = c.norm() / scale;
            if i > 0 {
                magnitude *= 2.0;
            }
            Sample::new(i as f64 * resolution, magnitude)
        })
        .collect();

    Some(Spectrum {
        magnitudes,
        coefficients: buffer,
    })
}
