//! BioChart-Processing: transforms for biosignal channels
//!
//! Filters, spectrum, peak and heart-rate queries, transform descriptors and
//! per-channel parallel application.

pub mod batch;
pub mod config;
pub mod features;
pub mod filters;
pub mod processor;
pub mod spectrum;

pub use batch::{apply_to_channels, apply_to_store};
pub use config::{Transform, TransformError, TransformResult};
pub use features::{detect_peaks, heart_rate_from_peak_times, HEART_RATE_PEAK_THRESHOLD};
pub use filters::RcCoefficients;
pub use processor::SignalProcessor;
pub use spectrum::{compute_spectrum, Spectrum};
