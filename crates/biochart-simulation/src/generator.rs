//! Seeded synthetic channel generator

use crate::signal_patterns::Waveform;
use biochart_core::{Channel, ChannelStore, ChartConfig};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Demo recording length in seconds
pub const DEMO_DURATION: f64 = 10.0;

/// Demo sampling rate in Hz
pub const DEMO_SAMPLE_RATE: f64 = 250.0;

/// Channel IDs and waveforms of the bedside demo layout
pub const DEMO_LAYOUT: [(&str, Waveform); 4] = [
    ("1", Waveform::Ecg),
    ("2", Waveform::BloodPressure),
    ("3", Waveform::Spo2),
    ("4", Waveform::Respiration),
];

/// Generator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility; time-seeded when `None`
    pub seed: Option<u64>,
    /// Peak-to-peak amplitude of the uniform noise added to every sample
    pub noise_amplitude: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            noise_amplitude: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Fills channels with synthetic waveforms
pub struct SyntheticGenerator {
    config: SimulationConfig,
    rng: rand::rngs::StdRng,
}

impl SyntheticGenerator {
    pub fn new(config: SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });

        Self {
            config,
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the raw series of `channel` with `duration` seconds of
    /// `waveform` sampled at `sample_rate`.
    ///
    /// Returns the number of samples written.
    pub fn generate(&mut self, channel: &mut Channel, waveform: Waveform, duration: f64, sample_rate: f64) -> usize {
        channel.clear_data();

        let total = duration * sample_rate;
        if !(total.is_finite() && total > 0.0) {
            return 0;
        }
        let total = total as usize;
        let step = 1.0 / sample_rate;

        channel.raw.reserve(total);
        for i in 0..total {
            let t = i as f64 * step;
            let value = waveform.value_at(t, &mut self.rng) + self.noise();
            channel.push_sample(t, value);
        }

        tracing::debug!(
            channel = %channel.id,
            waveform = waveform.name(),
            samples = total,
            "synthetic channel generated"
        );
        total
    }

    fn noise(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * self.config.noise_amplitude
    }
}

/// Fill channels "1".."4" with ECG, blood pressure, SpO2 and respiration.
///
/// Missing channels are created from the default chart layout. Y-axis ranges
/// are set so each waveform fits its track.
pub fn populate_demo_store(store: &mut ChannelStore, generator: &mut SyntheticGenerator) {
    let layout = ChartConfig::default();

    for (id, waveform) in DEMO_LAYOUT {
        if !store.contains(id) {
            let channel = layout
                .channel(id)
                .map(|c| c.to_channel())
                .unwrap_or_else(|| Channel::new(id, waveform.name()));
            store.insert(channel);
        }

        if let Some(channel) = store.get_mut(id) {
            generator.generate(channel, waveform, DEMO_DURATION, DEMO_SAMPLE_RATE);
            let (min, max) = waveform.display_range();
            channel.set_y_range(min, max);
        }
    }
}
