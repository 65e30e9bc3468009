//! Error types for palette handling.

use isoline_render::RenderError;

/// Result type alias for palette operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or uploading a palette.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Palette text parsing error.
    #[error("palette parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// A palette without any stops.
    #[error("palette has no color stops")]
    EmptyPalette,

    /// A stop value that is NaN or infinite.
    #[error("palette stop value {0} is not finite")]
    NonFiniteStop(f32),

    /// Uploading the palette texture failed.
    #[error("failed to create palette texture: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }
}
