//! Error handling for the container decoder and configuration layer
//!
//! Decoding failures are typed so that a caller loading several signals can
//! tell an I/O fault from a corrupt header or a bad index and decide whether
//! to skip the signal and carry on.

use std::fmt;
use thiserror::Error;

/// Result type alias for container decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while opening or reading a biosignal container
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Underlying seek/read failure (including truncated files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-width header field did not hold the expected text
    #[error("malformed header field `{field}`: {value:?}")]
    Malformed {
        /// Name of the header field
        field: &'static str,
        /// Trimmed text found in the field
        value: String,
    },

    /// Signal index, record index or record count outside the container
    #[error("{what} {index} out of range (limit {limit})")]
    OutOfRange {
        /// What was being indexed
        what: &'static str,
        /// Requested value
        index: usize,
        /// Exclusive upper bound
        limit: usize,
    },
}

/// Coarse classification of a [`DecodeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    Io,
    Malformed,
    OutOfRange,
}

impl DecodeError {
    /// Classify this error
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Io(_) => DecodeErrorKind::Io,
            DecodeError::Malformed { .. } => DecodeErrorKind::Malformed,
            DecodeError::OutOfRange { .. } => DecodeErrorKind::OutOfRange,
        }
    }

    pub(crate) fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        DecodeError::Malformed {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn out_of_range(what: &'static str, index: usize, limit: usize) -> Self {
        DecodeError::OutOfRange { what, index, limit }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeErrorKind::Io => "io",
            DecodeErrorKind::Malformed => "malformed",
            DecodeErrorKind::OutOfRange => "out-of-range",
        };
        f.write_str(name)
    }
}

/// Result type alias for container encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors raised while building or writing a container
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record did not carry one chunk per declared signal
    #[error("record has {actual} signal chunks, expected {expected}")]
    SignalCountMismatch { expected: usize, actual: usize },

    /// A signal chunk length differs from its declared samples per record
    #[error("signal {signal} chunk has {actual} samples, expected {expected}")]
    ChunkLengthMismatch {
        signal: usize,
        expected: usize,
        actual: usize,
    },

    /// A numeric header value cannot be written within its field width
    /// without losing its magnitude
    #[error("header field `{field}` cannot hold {value}")]
    FieldOverflow { field: &'static str, value: f64 },

    /// Signals cannot be added once records have been pushed
    #[error("cannot add a signal after data records were written")]
    SignalsFrozen,
}

/// Errors raised while loading or saving display configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}
