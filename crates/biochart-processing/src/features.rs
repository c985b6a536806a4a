//! Peak detection and heart-rate estimation

use biochart_core::Sample;

/// Peak threshold used for heart-rate estimation
pub const HEART_RATE_PEAK_THRESHOLD: f64 = 0.5;

/// Minimum series length for peak detection
pub const PEAK_MIN_POINTS: usize = 3;

/// Indices of local maxima above `threshold`, in ascending order.
///
/// Index `i` qualifies when its value exceeds the threshold, is strictly
/// greater than its left neighbour and at least its right neighbour. The
/// first and last samples never qualify.
pub fn detect_peaks(samples: &[Sample], threshold: f64) -> Vec<usize> {
    if samples.len() < PEAK_MIN_POINTS {
        return Vec::new();
    }

    samples
        .windows(3)
        .enumerate()
        .filter(|(_, w)| {
            let value = w[1].value;
            value > threshold && value > w[0].value && value >= w[2].value
        })
        .map(|(i, _)| i + 1)
        .collect()
}

/// Beats per minute from ordered peak times in seconds.
///
/// Returns 0 for fewer than two peaks or a non-positive mean interval.
pub fn heart_rate_from_peak_times(times: &[f64]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }

    let total: f64 = times.windows(2).map(|w| w[1] - w[0]).sum();
    let mean_interval = total / (times.len() - 1) as f64;
    if mean_interval <= 0.0 {
        return 0.0;
    }
    60.0 / mean_interval
}

/// Heart rate from the peaks of `samples` above [`HEART_RATE_PEAK_THRESHOLD`]
pub fn heart_rate(samples: &[Sample]) -> f64 {
    let times: Vec<f64> = detect_peaks(samples, HEART_RATE_PEAK_THRESHOLD)
        .into_iter()
        .map(|i| samples[i].time)
        .collect();
    heart_rate_from_peak_times(&times)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as f64, v))
            .collect()
    }

    #[test]
    fn test_detect_peaks_plateau() {
        let samples = values(&[0.0, 0.0, 5.0, 0.0, 0.0, 5.0, 5.0, 0.0]);
        assert_eq!(detect_peaks(&samples, 2.0), vec![2, 5]);
    }

    #[test]
    fn test_detect_peaks_threshold_and_edges() {
        let samples = values(&[9.0, 1.0, 3.0, 1.0, 9.0]);
        assert_eq!(detect_peaks(&samples, 2.0), vec![2]);
        assert!(detect_peaks(&samples, 3.0).is_empty());
        assert!(detect_peaks(&samples[..2], 0.0).is_empty());
    }

    #[test]
    fn test_detect_peaks_is_pure() {
        let samples = values(&[0.0, 1.0, 0.0, 2.0, 0.0]);
        assert_eq!(detect_peaks(&samples, 0.5), detect_peaks(&samples, 0.5));
    }

    #[test]
    fn test_heart_rate_from_peak_times() {
        assert!((heart_rate_from_peak_times(&[0.0, 0.8, 1.6]) - 75.0).abs() < 1e-9);
        assert_eq!(heart_rate_from_peak_times(&[1.0]), 0.0);
        assert_eq!(heart_rate_from_peak_times(&[]), 0.0);
        assert_eq!(heart_rate_from_peak_times(&[2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_heart_rate_from_series() {
        let samples = vec![
            Sample::new(0.0, 0.0),
            Sample::new(0.4, 1.0),
            Sample::new(0.8, 0.0),
            Sample::new(1.2, 1.0),
            Sample::new(1.6, 0.0),
            Sample::new(2.0, 0.3),
            Sample::new(2.4, 0.0),
        ];
        // The 0.3 bump is under the threshold
        assert!((heart_rate(&samples) - 75.0).abs() < 1e-9);
        assert_eq!(heart_rate(&samples[..3]), 0.0);
    }
}
