//! Applying one transform across many channels in parallel
//!
//! Each channel is handed to exactly one rayon worker, so no two workers
//! ever write the same processed series.

use crate::config::Transform;
use crate::processor::SignalProcessor;
use biochart_core::{Channel, ChannelStore};
use rayon::prelude::*;

/// Apply `transform` to every channel in the slice
pub fn apply_to_channels(processor: &SignalProcessor, channels: &mut [Channel], transform: Transform) {
    channels
        .par_iter_mut()
        .for_each(|channel| transform.apply(processor, channel));
}

/// Apply `transform` to the store channels selected by `ids`, or to all
/// channels when `ids` is `None`. Returns the number of channels visited.
pub fn apply_to_store(
    processor: &SignalProcessor,
    store: &mut ChannelStore,
    ids: Option<&[String]>,
    transform: Transform,
) -> usize {
    let targets: Vec<&mut Channel> = store
        .channels_mut()
        .filter(|channel| ids.map_or(true, |ids| ids.contains(&channel.id)))
        .collect();
    let count = targets.len();

    targets
        .into_par_iter()
        .for_each(|channel| transform.apply(processor, channel));

    tracing::debug!(channels = count, %transform, "batch transform applied");
    count
}
