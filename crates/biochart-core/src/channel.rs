//! Channel: core container for one time-series track and its display attributes

use crate::config::ChartConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default waveform colour for a freshly created channel
pub const DEFAULT_CHANNEL_COLOR: &str = "#FF0000";

/// One point of a time series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Time in seconds (or frequency in Hz for spectra)
    pub time: f64,
    /// Value in physical units
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// A single signal track.
///
/// `raw` holds the ingested series. `processed` is owned separately and is
/// replaced wholesale by every transform; it keeps no history. Both series are
/// expected to be non-decreasing in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique identifier within a [`ChannelStore`]
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Ingested samples
    pub raw: Vec<Sample>,
    /// Output of the most recent transform
    pub processed: Vec<Sample>,
    /// Whether the waveform is drawn
    pub visible: bool,
    /// Line colour as `#RRGGBB`
    pub color: String,
    /// Display scale factor
    pub scale: f64,
    /// Lower bound of the Y axis in physical units
    pub y_axis_min: f64,
    /// Upper bound of the Y axis in physical units
    pub y_axis_max: f64,
}

impl Channel {
    /// Create an empty, visible channel with default display attributes
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            raw: Vec::new(),
            processed: Vec::new(),
            visible: true,
            color: DEFAULT_CHANNEL_COLOR.to_string(),
            scale: 1.0,
            y_axis_min: -1.0,
            y_axis_max: 1.0,
        }
    }

    /// Append one raw sample
    pub fn push_sample(&mut self, time: f64, value: f64) {
        self.raw.push(Sample::new(time, value));
    }

    /// Replace the processed series
    pub fn set_processed(&mut self, processed: Vec<Sample>) {
        self.processed = processed;
    }

    /// Drop both raw and processed data
    pub fn clear_data(&mut self) {
        self.raw.clear();
        self.processed.clear();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) {
        self.y_axis_min = min;
        self.y_axis_max = max;
    }

    /// Clamp a physical value into the Y-axis range; a degenerate range
    /// passes values through
    pub fn clip_to_y_range(&self, value: f64) -> f64 {
        if self.y_axis_max > self.y_axis_min {
            value.clamp(self.y_axis_min, self.y_axis_max)
        } else {
            value
        }
    }

    /// Number of raw samples
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Time span covered by the raw series, in seconds
    pub fn duration(&self) -> f64 {
        match (self.raw.first(), self.raw.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Check that both series are non-decreasing in time
    pub fn is_time_ordered(&self) -> bool {
        let ordered = |series: &[Sample]| series.windows(2).all(|w| w[0].time <= w[1].time);
        ordered(&self.raw) && ordered(&self.processed)
    }
}

/// Mapping from channel ID to channel.
///
/// Storage order is irrelevant; stacking order for rendering comes from an
/// external list of IDs.
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    channels: HashMap<String, Channel>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with one empty channel per configured entry
    pub fn from_config(config: &ChartConfig) -> Self {
        let mut store = Self::new();
        for entry in &config.channels {
            store.insert(entry.to_channel());
        }
        store
    }

    /// Insert a channel, replacing and returning any channel with the same ID
    pub fn insert(&mut self, channel: Channel) -> Option<Channel> {
        self.channels.insert(channel.id.clone(), channel)
    }

    pub fn get(&self, id: &str) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Channel> {
        self.channels.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Channel> {
        self.channels.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.channels.contains_key(id)
    }

    /// Toggle visibility; returns false when the ID is unknown
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.channels.get_mut(id) {
            Some(channel) => {
                channel.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// All IDs, sorted for a stable listing
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.channels.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
