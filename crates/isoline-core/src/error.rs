//! Error types for the core crate.

use thiserror::Error;

/// Errors raised when constructing core geographic and viewport values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Bounds with a non-finite coordinate or an inverted axis.
    #[error("invalid geographic bounds [{west}, {south}, {east}, {north}]")]
    InvalidBounds {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },

    /// A latitude outside [-90, 90].
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// A zoom range whose minimum lies above its maximum.
    #[error("invalid zoom range: min zoom {min} is greater than max zoom {max}")]
    InvalidZoomRange { min: f64, max: f64 },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
