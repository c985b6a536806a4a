//! Error handling for image export

use thiserror::Error;

/// Result type alias for export operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while encoding or writing a rendered buffer.
///
/// Rendering itself never fails; missing or invalid data degrades to blank
/// tracks.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}
