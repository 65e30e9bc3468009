//! Error types for the render crate.

use thiserror::Error;

use crate::texture::TextureId;

/// Errors that can occur during graphics operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No suitable graphics adapter was found.
    #[error("no suitable graphics adapter found")]
    NoAdapter,

    /// Failed to request a graphics device.
    #[error("failed to request graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Invalid texture dimensions (zero width or height).
    #[error("invalid texture dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A raster buffer whose length does not describe a supported image.
    #[error("invalid texture data for {width}x{height} image with {len} samples: {reason}")]
    InvalidTextureData {
        width: u32,
        height: u32,
        len: usize,
        reason: &'static str,
    },

    /// A uniform block names a module the shader does not contain.
    #[error("unknown shader module '{0}'")]
    UnknownModule(String),

    /// A uniform value that does not match the module's schema.
    #[error("uniform '{module}.{field}': {reason}")]
    UniformMismatch {
        module: String,
        field: String,
        reason: String,
    },

    /// A uniform required by the shader has never been set.
    #[error("uniform '{module}.{field}' has not been set")]
    MissingUniform { module: String, field: String },

    /// The device has no render target for the draw call.
    #[error("no render target set")]
    MissingRenderTarget,

    /// A texture created by a different device or backend.
    #[error("texture {0:?} was not created by this device")]
    ForeignTexture(TextureId),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
