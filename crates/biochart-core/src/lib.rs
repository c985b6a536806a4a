//! BioChart-Core: foundation types for biosignal charting
//!
//! Channels and the channel store, the fixed-layout container decoder and
//! writer, and the display configuration shared by the other crates.

pub mod channel;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod metadata;
pub mod timestamp;
pub mod writer;

pub use channel::*;
pub use config::{ChannelConfig, ChartConfig, DisplayConfig};
pub use error::{
    ConfigError, ConfigResult, DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeResult,
};
pub use format::EdfReader;
pub use loader::{load_channels, signal_channel_id, signal_index, LoadReport};
pub use metadata::{ChannelInfo, EdfHeader, SignalHeader};
pub use writer::{EdfWriter, SignalSpec};
