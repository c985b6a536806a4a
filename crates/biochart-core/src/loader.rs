//! Loading several container signals into a channel store
//!
//! A signal that fails to decode is reported and skipped; the remaining
//! signals still load.

use crate::channel::{Channel, ChannelStore};
use crate::error::DecodeError;
use crate::format::EdfReader;
use std::io::{Read, Seek};

/// Colours assigned to loaded signals in file order, cycling
pub const SIGNAL_PALETTE: &[&str] = &["#FF0000", "#00FF00", "#0000FF", "#FFFF00"];

/// Outcome of a multi-signal load
#[derive(Debug, Default)]
pub struct LoadReport {
    /// IDs of channels that were loaded and inserted
    pub loaded: Vec<String>,
    /// Signals that failed, with the reason
    pub failed: Vec<(usize, DecodeError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Channel ID used for a signal index: one-based, matching the display
/// configuration's slot IDs
pub fn signal_channel_id(signal_index: usize) -> String {
    (signal_index + 1).to_string()
}

/// Signal index a loaded channel ID was assigned from
pub fn signal_index(channel_id: &str) -> Option<usize> {
    channel_id.parse::<usize>().ok()?.checked_sub(1)
}

/// Load up to `max_signals` signals (all when `None`) into `store`.
///
/// Channel IDs are the one-based signal positions, names are the signal labels and the
/// Y-axis range is the signal's physical range. Failed signals are not
/// inserted.
pub fn load_channels<R: Read + Seek>(
    reader: &mut EdfReader<R>,
    store: &mut ChannelStore,
    max_signals: Option<usize>,
) -> LoadReport {
    let count = max_signals.map_or(reader.num_signals(), |max| max.min(reader.num_signals()));
    let mut report = LoadReport::default();

    for index in 0..count {
        let Some(info) = reader.channel_info(index) else {
            continue;
        };

        let mut channel = Channel::new(signal_channel_id(index), info.label);
        channel.set_y_range(info.physical_min, info.physical_max);
        channel.color = SIGNAL_PALETTE[index % SIGNAL_PALETTE.len()].to_string();

        match reader.load_into_channel(index, &mut channel) {
            Ok(()) => {
                report.loaded.push(channel.id.clone());
                store.insert(channel);
            }
            Err(e) => {
                tracing::warn!("failed to load signal {}: {}", index, e);
                report.failed.push((index, e));
            }
        }
    }

    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "container signals loaded"
    );
    report
}
