//! Channel rasterizer with vertical track stacking

use crate::color::{waveform_color, DEFAULT_BACKGROUND, DEFAULT_GRID_COLOR};
use crate::error::RenderResult;
use crate::raster::{self, Projection, Segment};
use biochart_core::{Channel, ChannelStore, ChartConfig, Sample};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Track height used when there is nothing to stack and no canvas height
pub const FALLBACK_HEIGHT: u32 = 300;

/// Which series of a channel is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    #[default]
    Raw,
    Processed,
}

impl Series {
    fn of(self, channel: &Channel) -> &[Sample] {
        match self {
            Series::Raw => &channel.raw,
            Series::Processed => &channel.processed,
        }
    }
}

/// Draws channels into RGBA pixel buffers.
///
/// The viewport maps sample time to columns as `(t - offset_x) * scale_x`.
/// `scale_x` is not clamped; callers keep it positive and finite.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub width: u32,
    pub height: u32,
    pub offset_x: f64,
    pub scale_x: f64,
    pub grid_visible: bool,
    pub grid_color: Rgba<u8>,
    pub background: Rgba<u8>,
    pub series: Series,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            scale_x: 1.0,
            grid_visible: true,
            grid_color: DEFAULT_GRID_COLOR,
            background: DEFAULT_BACKGROUND,
            series: Series::Raw,
        }
    }

    /// Pan and zoom
    pub fn set_viewport(&mut self, offset_x: f64, scale_x: f64) {
        self.offset_x = offset_x;
        self.scale_x = scale_x;
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    pub fn set_colors(&mut self, grid: Rgba<u8>, background: Rgba<u8>) {
        self.grid_color = grid;
        self.background = background;
    }

    pub fn set_series(&mut self, series: Series) {
        self.series = series;
    }

    /// Background-filled buffer with the grid when enabled
    fn blank(&self, height: u32) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, height, self.background);
        if self.grid_visible {
            raster::draw_grid(&mut img, self.grid_color);
        }
        img
    }

    /// Segments the waveform of `channel` would draw in a track of `track_height`
    pub fn waveform_segments(&self, channel: &Channel, track_height: u32) -> Vec<Segment> {
        let samples = self.series.of(channel);
        let y_scale = f64::from(track_height) / (channel.y_axis_max - channel.y_axis_min);
        if samples.is_empty() || !y_scale.is_finite() || y_scale == 0.0 {
            return Vec::new();
        }

        let projection = Projection {
            offset_x: self.offset_x,
            scale_x: self.scale_x,
            y_min: channel.y_axis_min,
            y_scale,
            width: self.width,
            height: track_height,
        };
        raster::project_segments(samples, &projection)
    }

    /// Render one channel into a `width x track_height` buffer.
    ///
    /// Hidden or empty channels still produce a (possibly gridded) track.
    pub fn render_channel(&self, channel: &Channel, track_height: u32) -> RgbaImage {
        let mut img = self.blank(track_height);
        if !channel.visible || self.series.of(channel).is_empty() {
            return img;
        }

        let color = waveform_color(&channel.color);
        for segment in self.waveform_segments(channel, track_height) {
            raster::draw_line(&mut img, segment, color);
        }
        img
    }

    /// Stack the channels named by `ordered_ids` top to bottom.
    ///
    /// IDs missing from the store become hidden placeholder tracks.
    pub fn render_all_channels(
        &self,
        ordered_ids: &[String],
        store: &ChannelStore,
        track_height: u32,
    ) -> RgbaImage {
        self.stack(ordered_ids, store, track_height, None)
    }

    /// Stack channels in configuration order, or sorted store order when the
    /// configuration lists no channels.
    pub fn render_configured(&self, config: &ChartConfig, store: &ChannelStore, track_height: u32) -> RgbaImage {
        let ids = if config.channels.is_empty() {
            store.ids()
        } else {
            config.ordered_ids()
        };
        self.stack(&ids, store, track_height, Some(config))
    }

    fn stack(
        &self,
        ordered_ids: &[String],
        store: &ChannelStore,
        track_height: u32,
        config: Option<&ChartConfig>,
    ) -> RgbaImage {
        let total_height = stacked_height(ordered_ids.len(), track_height).unwrap_or_else(|| {
            tracing::warn!(
                tracks = ordered_ids.len(),
                track_height,
                "stacked image height overflows, rendering blank image"
            );
            0
        });
        if total_height == 0 {
            let height = if self.height > 0 { self.height } else { FALLBACK_HEIGHT };
            return self.blank(height);
        }

        let mut img = RgbaImage::from_pixel(self.width, total_height, self.background);
        for (slot, id) in ordered_ids.iter().enumerate() {
            let track = match store.get(id) {
                Some(channel) => self.render_channel(channel, track_height),
                None => {
                    let name = config.and_then(|c| c.channel_name(id)).unwrap_or(id);
                    let mut placeholder = Channel::new(id.as_str(), name);
                    placeholder.visible = false;
                    tracing::debug!(channel = %id, "rendering placeholder track");
                    self.render_channel(&placeholder, track_height)
                }
            };
            let top = slot as i64 * i64::from(track_height);
            imageops::replace(&mut img, &track, 0, top);
        }
        img
    }
}

/// Height of `count` stacked tracks, `None` when it does not fit in `u32`
fn stacked_height(count: usize, track_height: u32) -> Option<u32> {
    u32::try_from(count).ok()?.checked_mul(track_height)
}

/// Write a rendered buffer as PNG
pub fn save_png(img: &RgbaImage, path: impl AsRef<Path>) -> RenderResult<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Encode a rendered buffer as PNG bytes
pub fn encode_png(img: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
