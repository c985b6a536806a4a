//! BioChart-Render: pixel rasterizer for channel waveforms
//!
//! Tracks are drawn into RGBA buffers: background, optional 50px grid, then a
//! decimated Bresenham polyline. Several tracks stack vertically.

pub mod color;
pub mod error;
pub mod raster;
pub mod renderer;

pub use color::{parse_hex_color, ColorError};
pub use error::{RenderError, RenderResult};
pub use raster::Segment;
pub use renderer::{encode_png, save_png, Renderer, Series, FALLBACK_HEIGHT};
