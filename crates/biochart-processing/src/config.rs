//! Transform descriptors
//!
//! A [`Transform`] names one processor operation with its parameters so it can
//! travel through JSON configuration or a command line.

use crate::processor::SignalProcessor;
use biochart_core::Channel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type alias for transform descriptor parsing
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors raised while parsing a transform descriptor
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unknown transform `{0}`")]
    Unknown(String),

    #[error("transform `{name}` expects {expected} parameter(s), got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter `{value}` for transform `{name}`")]
    Parameter { name: String, value: String },

    #[error("invalid transform JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One processing operation and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Differentiate,
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_cutoff_hz: f64, high_cutoff_hz: f64 },
    MovingAverage { window: usize },
    Spectrum,
}

impl Transform {
    /// Run this transform on `channel`, replacing its processed series
    pub fn apply(&self, processor: &SignalProcessor, channel: &mut Channel) {
        match *self {
            Transform::Differentiate => processor.differentiate(channel),
            Transform::LowPass { cutoff_hz } => processor.low_pass(channel, cutoff_hz),
            Transform::HighPass { cutoff_hz } => processor.high_pass(channel, cutoff_hz),
            Transform::BandPass {
                low_cutoff_hz,
                high_cutoff_hz,
            } => processor.band_pass(channel, low_cutoff_hz, high_cutoff_hz),
            Transform::MovingAverage { window } => processor.moving_average(channel, window),
            Transform::Spectrum => {
                processor.spectrum(channel);
            }
        }
    }

    /// Whether the output is indexed by frequency rather than time
    pub fn is_frequency_domain(&self) -> bool {
        matches!(self, Transform::Spectrum)
    }

    pub fn to_json(&self) -> TransformResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> TransformResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn parse_param<T: FromStr>(name: &str, value: &str) -> TransformResult<T> {
    value.trim().parse().map_err(|_| TransformError::Parameter {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn expect_arity(name: &str, params: &[&str], expected: usize) -> TransformResult<()> {
    if params.len() != expected {
        return Err(TransformError::Arity {
            name: name.to_string(),
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

/// Parses `diff`, `lowpass:40`, `highpass:0.5`, `bandpass:0.5:40`, `ma:5`,
/// `fft`, or a JSON object.
impl FromStr for Transform {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('{') {
            return Transform::from_json(s);
        }

        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let params: Vec<&str> = parts.collect();

        let transform = match name.as_str() {
            "diff" | "differentiate" => {
                expect_arity(&name, &params, 0)?;
                Transform::Differentiate
            }
            "lowpass" | "lp" => {
                expect_arity(&name, &params, 1)?;
                Transform::LowPass {
                    cutoff_hz: parse_param(&name, params[0])?,
                }
            }
            "highpass" | "hp" => {
                expect_arity(&name, &params, 1)?;
                Transform::HighPass {
                    cutoff_hz: parse_param(&name, params[0])?,
                }
            }
            "bandpass" | "bp" => {
                expect_arity(&name, &params, 2)?;
                Transform::BandPass {
                    low_cutoff_hz: parse_param(&name, params[0])?,
                    high_cutoff_hz: parse_param(&name, params[1])?,
                }
            }
            "ma" | "movavg" | "moving_average" => {
                expect_arity(&name, &params, 1)?;
                Transform::MovingAverage {
                    window: parse_param(&name, params[0])?,
                }
            }
            "fft" | "spectrum" => {
                expect_arity(&name, &params, 0)?;
                Transform::Spectrum
            }
            _ => return Err(TransformError::Unknown(s.to_string())),
        };
        Ok(transform)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Differentiate => write!(f, "diff"),
            Transform::LowPass { cutoff_hz } => write!(f, "lowpass:{}", cutoff_hz),
            Transform::HighPass { cutoff_hz } => write!(f, "highpass:{}", cutoff_hz),
            Transform::BandPass {
                low_cutoff_hz,
                high_cutoff_hz,
            } => write!(f, "bandpass:{}:{}", low_cutoff_hz, high_cutoff_hz),
            Transform::MovingAverage { window } => write!(f, "ma:{}", window),
            Transform::Spectrum => write!(f, "fft"),
        }
    }
}
