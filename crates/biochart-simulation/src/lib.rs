//! BioChart-Simulation: synthetic physiological signals
//!
//! Deterministic waveform shapes plus seeded uniform noise, for demos and
//! tests without a recording at hand.

pub mod generator;
pub mod signal_patterns;

pub use generator::{
    populate_demo_store, SimulationConfig, SyntheticGenerator, DEMO_DURATION, DEMO_LAYOUT, DEMO_SAMPLE_RATE,
};
pub use signal_patterns::Waveform;
