//! Error types for contour layers.

use isoline_core::CoreError;
use isoline_render::{DataType, RenderError};
use thiserror::Error;

/// Errors returned from layer updates and draws.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Unscaling was requested for raster data that is not 8-bit.
    #[error("image unscale is only supported for uint8 data, got {found}")]
    UnscaleRequiresUint8 { found: DataType },

    /// The palette could not be parsed or uploaded.
    #[error("invalid palette: {0}")]
    Palette(#[from] isoline_style::Error),

    /// A device or shader error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Invalid geographic or zoom configuration.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;
