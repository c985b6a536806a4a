//! Pre-defined physiological waveform shapes

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Synthetic waveform kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Unit sine at 1 Hz
    Sine,
    /// P, Q, R, S and T segments repeating once per second
    Ecg,
    /// Systolic swing followed by exponential diastolic decay, 1 s period
    BloodPressure,
    /// Slow 0.25 Hz sine
    Respiration,
    /// Saturation oscillating around 98 %
    Spo2,
    /// Uniform noise in [-1, 1)
    Noise,
}

impl Waveform {
    /// Look up a waveform by short name. Unknown names give [`Waveform::Noise`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" => Waveform::Sine,
            "ecg" => Waveform::Ecg,
            "bp" | "blood_pressure" => Waveform::BloodPressure,
            "resp" | "respiration" => Waveform::Respiration,
            "spo2" => Waveform::Spo2,
            _ => Waveform::Noise,
        }
    }

    /// Short name accepted by [`Waveform::from_name`]
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Ecg => "ecg",
            Waveform::BloodPressure => "bp",
            Waveform::Respiration => "resp",
            Waveform::Spo2 => "spo2",
            Waveform::Noise => "noise",
        }
    }

    /// Y-axis range that keeps the whole waveform on screen
    pub fn display_range(&self) -> (f64, f64) {
        match self {
            Waveform::Ecg => (-1.0, 2.0),
            Waveform::BloodPressure => (30.0, 130.0),
            Waveform::Spo2 => (96.0, 100.0),
            Waveform::Sine | Waveform::Respiration | Waveform::Noise => (-1.5, 1.5),
        }
    }

    /// Noise-free value at `time` seconds; `None` for [`Waveform::Noise`]
    pub fn shape_at(&self, time: f64) -> Option<f64> {
        let value = match self {
            Waveform::Sine => (2.0 * PI * time).sin(),
            Waveform::Ecg => ecg_at(time.rem_euclid(1.0)),
            Waveform::BloodPressure => blood_pressure_at(time.rem_euclid(1.0)),
            Waveform::Respiration => (2.0 * PI * time / 4.0).sin(),
            Waveform::Spo2 => 98.0 + (2.0 * PI * time).sin(),
            Waveform::Noise => return None,
        };
        Some(value)
    }

    /// Value at `time`, drawing from `rng` for the noise waveform
    pub fn value_at<R: Rng + ?Sized>(&self, time: f64, rng: &mut R) -> f64 {
        self.shape_at(time)
            .unwrap_or_else(|| (rng.gen::<f64>() - 0.5) * 2.0)
    }

    pub fn all() -> [Waveform; 6] {
        [
            Waveform::Sine,
            Waveform::Ecg,
            Waveform::BloodPressure,
            Waveform::Respiration,
            Waveform::Spo2,
            Waveform::Noise,
        ]
    }
}

/// One heartbeat, `phase` in [0, 1)
fn ecg_at(phase: f64) -> f64 {
    if phase < 0.1 {
        // P
        0.25 * (2.0 * PI * phase / 0.2).sin()
    } else if phase < 0.4 {
        0.0
    } else if phase < 0.45 {
        // Q
        -0.5 * (phase - 0.4) / 0.05
    } else if phase < 0.5 {
        // R upstroke
        -0.5 + 2.0 * (phase - 0.45) / 0.05
    } else if phase < 0.55 {
        // S
        1.5 - 2.0 * (phase - 0.5) / 0.05
    } else if phase < 0.7 {
        // T
        -0.5 + 0.75 * (PI * (phase - 0.55) / 0.15).sin()
    } else {
        0.0
    }
}

/// One pressure cycle, `phase` in [0, 1)
fn blood_pressure_at(phase: f64) -> f64 {
    if phase < 0.3 {
        80.0 + 40.0 * (PI / 2.0 + PI * phase / 0.3).sin()
    } else {
        80.0 + 40.0 * (PI / 2.0 + PI).sin() * (-(phase - 0.3) / 0.5).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_name() {
        assert_eq!(Waveform::from_name("ECG"), Waveform::Ecg);
        assert_eq!(Waveform::from_name("bp"), Waveform::BloodPressure);
        assert_eq!(Waveform::from_name("whatever"), Waveform::Noise);
        for waveform in Waveform::all() {
            assert_eq!(Waveform::from_name(waveform.name()), waveform);
        }
    }

    #[test]
    fn test_ecg_r_peak() {
        assert!((ecg_at(0.5) - 1.5).abs() < 1e-12);
        assert!((ecg_at(0.45) + 0.5).abs() < 1e-12);
        assert_eq!(ecg_at(0.2), 0.0);
        assert_eq!(ecg_at(0.9), 0.0);
        // Same point one period later
        let a = Waveform::Ecg.shape_at(0.25).unwrap();
        let b = Waveform::Ecg.shape_at(3.25).unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_blood_pressure_cycle() {
        assert!((blood_pressure_at(0.0) - 120.0).abs() < 1e-9);
        assert!((blood_pressure_at(0.3) - 40.0).abs() < 1e-9);
        assert!(blood_pressure_at(0.99) > blood_pressure_at(0.5));
    }

    #[test]
    fn test_shapes_stay_in_display_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for waveform in Waveform::all() {
            let (min, max) = waveform.display_range();
            for i in 0..1000 {
                let v = waveform.value_at(i as f64 * 0.01, &mut rng);
                assert!(v >= min && v <= max, "{:?} {}", waveform, v);
            }
        }
    }

    #[test]
    fn test_noise_uses_rng() {
        assert!(Waveform::Noise.shape_at(0.0).is_none());
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        assert_eq!(
            Waveform::Noise.value_at(0.0, &mut a),
            Waveform::Noise.value_at(0.0, &mut b)
        );
    }
}
