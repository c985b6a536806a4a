//! `#RRGGBB` colour parsing

use image::Rgba;
use thiserror::Error;

/// Waveform colour used when a channel colour cannot be parsed
pub const FALLBACK_WAVEFORM_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Default grid line colour
pub const DEFAULT_GRID_COLOR: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Default canvas background
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Errors raised by [`parse_hex_color`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("colour must start with '#': {0:?}")]
    MissingHash(String),

    #[error("colour must have exactly 6 hex digits: {0:?}")]
    Length(String),

    #[error("colour contains non-hex digits: {0:?}")]
    InvalidDigit(String),
}

/// Parse an opaque colour written as `#RRGGBB`
pub fn parse_hex_color(text: &str) -> Result<Rgba<u8>, ColorError> {
    let Some(digits) = text.strip_prefix('#') else {
        return Err(ColorError::MissingHash(text.to_string()));
    };
    if digits.len() != 6 {
        return Err(ColorError::Length(text.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidDigit(text.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidDigit(text.to_string()))
    };
    Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

/// Parse `text`, falling back to red
pub fn waveform_color(text: &str) -> Rgba<u8> {
    parse_hex_color(text).unwrap_or_else(|e| {
        tracing::debug!("{}; using fallback colour", e);
        FALLBACK_WAVEFORM_COLOR
    })
}
