//! GPU layer for Isoline contour layers.
//!
//! This crate provides the device abstraction layers draw through, raster
//! textures, the shared placeholder texture cache and the composable shader
//! module system.
//!
//! # Devices
//!
//! Everything goes through the [`GpuDevice`] trait. [`WgpuDevice`] renders
//! with wgpu; [`HeadlessDevice`] validates and records the same traffic
//! without a GPU:
//!
//! ```
//! use isoline_render::{GpuDevice, HeadlessDevice, TextureData, WrapMode, create_texture};
//!
//! let device = HeadlessDevice::new();
//! let data = TextureData::float32(2, 2, vec![0.0, 1.0, 2.0, 3.0])?;
//! let texture = create_texture(&device, &data, WrapMode::ClampToEdge)?;
//!
//! assert_eq!(texture.device(), device.id());
//! assert_eq!(device.textures_created(), 1);
//! # Ok::<(), isoline_render::RenderError>(())
//! ```
//!
//! With a GPU:
//!
//! ```no_run
//! use isoline_render::{GraphicsConfig, WgpuDevice};
//!
//! let device = WgpuDevice::new(&GraphicsConfig::default())
//!     .expect("Failed to initialize graphics");
//! ```
//!
//! # Shader Modules
//!
//! A [`ShaderAssembly`] starts with the projection module and the drawable's
//! entry points, then stacks further [`ShaderModule`]s. Each module's uniform
//! block is kept in [`ShaderInputs`] and packed per draw.

mod device;
mod error;
mod headless;
mod model;
mod parameters;
mod placeholder;
pub mod shader;
mod texture;
mod types;
pub mod uniform_layout;
mod wgpu_device;

pub use device::{DeviceId, DrawCall, GpuDevice};
pub use error::{RenderError, RenderResult};
pub use headless::{DrawRecord, HeadlessDevice, HeadlessTexture, TextureRecord};
pub use model::Model;
pub use parameters::{BlendMode, CullMode, RenderParameterOverrides, RenderParameters};
pub use placeholder::PlaceholderTextureCache;
pub use shader::{
    ModuleUniforms, PROJECT_MODULE, ShaderAssembly, ShaderInputs, ShaderModule, UniformBlock,
    UniformField, UniformType, UniformValue,
};
pub use texture::{
    DataType, RasterBuffer, Texture, TextureData, TextureDescriptor, TextureFormat, TextureId,
    WrapMode, create_texture,
};
pub use types::Color;
pub use wgpu_device::{GraphicsConfig, RenderTarget, WgpuDevice, WgpuTexture};

// Re-export wgpu for hosts that hand in their own device or render target.
pub use wgpu;
