//! Raster buffers and GPU texture handles.
//!
//! [`TextureData`] is the application-facing raster: a width × height grid of
//! 1, 2 or 4 channel samples in one of the supported encodings. [`Texture`] is
//! the device-resident copy, a cheap-to-clone handle whose identity is the
//! allocation it points at.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use isoline_core::logging::targets;
use tracing::debug;

use crate::device::{DeviceId, GpuDevice};
use crate::error::{RenderError, RenderResult};

/// Global texture ID counter.
static TEXTURE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Numeric encoding of raster samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unsigned 8-bit samples, normalized to [0, 1] on the GPU.
    Uint8,
    /// 32-bit float samples in physical units.
    Float32,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Uint8 => f.write_str("uint8"),
            DataType::Float32 => f.write_str("float32"),
        }
    }
}

/// Raw raster samples, channel-interleaved, row-major from the top row.
#[derive(Clone, PartialEq)]
pub enum RasterBuffer {
    Uint8(Vec<u8>),
    Float32(Vec<f32>),
}

impl RasterBuffer {
    /// Number of samples (not texels).
    pub fn len(&self) -> usize {
        match self {
            RasterBuffer::Uint8(data) => data.len(),
            RasterBuffer::Float32(data) => data.len(),
        }
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sample encoding.
    pub fn data_type(&self) -> DataType {
        match self {
            RasterBuffer::Uint8(_) => DataType::Uint8,
            RasterBuffer::Float32(_) => DataType::Float32,
        }
    }

    /// The samples as bytes, as they are uploaded.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RasterBuffer::Uint8(data) => data.as_slice(),
            RasterBuffer::Float32(data) => bytemuck::cast_slice(data.as_slice()),
        }
    }
}

impl fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("data_type", &self.data_type())
            .field("len", &self.len())
            .finish()
    }
}

/// A raster input: a 2D grid of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    width: u32,
    height: u32,
    channels: u32,
    buffer: RasterBuffer,
}

impl TextureData {
    /// Create raster data, inferring the channel count from the buffer length.
    ///
    /// The buffer must hold exactly `width * height * channels` samples with
    /// `channels` one of 1, 2 or 4.
    pub fn new(width: u32, height: u32, buffer: RasterBuffer) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let texels = width as usize * height as usize;
        let len = buffer.len();
        let invalid = |reason| RenderError::InvalidTextureData {
            width,
            height,
            len,
            reason,
        };

        if len % texels != 0 {
            return Err(invalid("sample count is not a multiple of width * height"));
        }
        let channels = (len / texels) as u32;
        if !matches!(channels, 1 | 2 | 4) {
            return Err(invalid("only 1, 2 or 4 channels are supported"));
        }

        Ok(Self {
            width,
            height,
            channels,
            buffer,
        })
    }

    /// Create 8-bit raster data.
    pub fn uint8(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        Self::new(width, height, RasterBuffer::Uint8(data))
    }

    /// Create float raster data.
    pub fn float32(width: u32, height: u32, data: Vec<f32>) -> RenderResult<Self> {
        Self::new(width, height, RasterBuffer::Float32(data))
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per texel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Sample encoding.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.buffer.data_type()
    }

    /// The raw samples.
    #[inline]
    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    /// The GPU format this data uploads as.
    pub fn format(&self) -> TextureFormat {
        match (self.data_type(), self.channels) {
            (DataType::Uint8, 1) => TextureFormat::R8Unorm,
            (DataType::Uint8, 2) => TextureFormat::Rg8Unorm,
            (DataType::Uint8, _) => TextureFormat::Rgba8Unorm,
            (DataType::Float32, 1) => TextureFormat::R32Float,
            (DataType::Float32, 2) => TextureFormat::Rg32Float,
            (DataType::Float32, _) => TextureFormat::Rgba32Float,
        }
    }

    /// Read one texel the way a shader samples it.
    ///
    /// 8-bit samples are normalized to [0, 1]. Missing channels expand to
    /// `(r, 0, 0, 1)` / `(r, g, 0, 1)`, matching GPU format expansion.
    /// Coordinates are clamped to the grid.
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let channels = self.channels as usize;
        let start = (y * self.width as usize + x) * channels;

        let mut texel = [0.0, 0.0, 0.0, 1.0];
        for (c, slot) in texel.iter_mut().enumerate().take(channels) {
            *slot = match &self.buffer {
                RasterBuffer::Uint8(data) => data[start + c] as f32 / 255.0,
                RasterBuffer::Float32(data) => data[start + c],
            };
        }
        texel
    }
}

/// Pixel formats used by raster, palette and placeholder textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    R32Float,
    Rg32Float,
    Rgba32Float,
}

impl TextureFormat {
    /// Bytes per texel.
    pub const fn bytes_per_texel(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm => 2,
            TextureFormat::Rgba8Unorm => 4,
            TextureFormat::R32Float => 4,
            TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// The matching wgpu format.
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::R8Unorm => wgpu::TextureFormat::R8Unorm,
            TextureFormat::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
            TextureFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }
}

/// How texture coordinates outside [0, 1] are resolved horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Clamp to the edge texel.
    #[default]
    ClampToEdge,
    /// Tile the texture.
    Repeat,
}

impl WrapMode {
    /// Repeat for rasters that cover a full revolution, clamp otherwise.
    #[inline]
    pub fn for_repeat(repeat: bool) -> Self {
        if repeat {
            WrapMode::Repeat
        } else {
            WrapMode::ClampToEdge
        }
    }

    /// The matching wgpu address mode.
    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Description of a texture to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label.
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Horizontal wrap; vertical coordinates always clamp.
    pub wrap: WrapMode,
}

impl TextureDescriptor {
    /// Number of bytes a full upload must contain.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_texel() as usize
    }

    /// Check that `texels` is a complete upload for this descriptor.
    pub fn validate_texels(&self, texels: &[u8]) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if texels.len() != self.byte_len() {
            return Err(RenderError::InvalidTextureData {
                width: self.width,
                height: self.height,
                len: texels.len(),
                reason: "byte length does not match the texture format",
            });
        }
        Ok(())
    }
}

/// Unique identifier of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    /// The raw value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

struct TextureInner {
    id: TextureId,
    device: DeviceId,
    descriptor: TextureDescriptor,
    resource: Box<dyn Any + Send + Sync>,
}

/// A device-resident texture.
///
/// Cloning shares the same GPU resource; the resource is released when the
/// last clone is dropped. Equality is identity.
#[derive(Clone)]
pub struct Texture {
    inner: Arc<TextureInner>,
}

impl Texture {
    /// Wrap a backend resource. Called by [`GpuDevice`] implementations.
    pub fn new(
        device: DeviceId,
        descriptor: TextureDescriptor,
        resource: impl Any + Send + Sync,
    ) -> Self {
        Self {
            inner: Arc::new(TextureInner {
                id: TextureId(TEXTURE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
                device,
                descriptor,
                resource: Box::new(resource),
            }),
        }
    }

    /// Unique ID of this texture.
    #[inline]
    pub fn id(&self) -> TextureId {
        self.inner.id
    }

    /// The device that created this texture.
    #[inline]
    pub fn device(&self) -> DeviceId {
        self.inner.device
    }

    /// The descriptor the texture was created with.
    #[inline]
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.inner.descriptor
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.descriptor.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.descriptor.height
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.inner.descriptor.format
    }

    /// Horizontal wrap mode.
    #[inline]
    pub fn wrap(&self) -> WrapMode {
        self.inner.descriptor.wrap
    }

    /// Downcast the backend resource.
    pub fn resource<T: Any>(&self) -> Option<&T> {
        self.inner.resource.downcast_ref::<T>()
    }

    /// Whether two handles share one resource.
    #[inline]
    pub fn ptr_eq(a: &Texture, b: &Texture) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        Texture::ptr_eq(self, other)
    }
}

impl Eq for Texture {}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.inner.id)
            .field("label", &self.inner.descriptor.label)
            .field("width", &self.inner.descriptor.width)
            .field("height", &self.inner.descriptor.height)
            .field("format", &self.inner.descriptor.format)
            .field("wrap", &self.inner.descriptor.wrap)
            .finish()
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);

/// Upload raster data as a texture.
pub fn create_texture(
    device: &dyn GpuDevice,
    data: &TextureData,
    wrap: WrapMode,
) -> RenderResult<Texture> {
    let descriptor = TextureDescriptor {
        label: "raster",
        width: data.width(),
        height: data.height(),
        format: data.format(),
        wrap,
    };
    let texture = device.create_texture(&descriptor, data.buffer().as_bytes())?;

    debug!(
        target: targets::TEXTURE,
        id = texture.id().get(),
        width = data.width(),
        height = data.height(),
        format = ?descriptor.format,
        wrap = ?wrap,
        "created raster texture"
    );

    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_inference() {
        let data = TextureData::uint8(2, 2, vec![0; 8]).unwrap();
        assert_eq!(data.channels(), 2);
        assert_eq!(data.format(), TextureFormat::Rg8Unorm);

        let data = TextureData::float32(2, 1, vec![0.0; 8]).unwrap();
        assert_eq!(data.channels(), 4);
        assert_eq!(data.format(), TextureFormat::Rgba32Float);
    }

    #[test]
    fn test_rejects_three_channels() {
        let err = TextureData::uint8(2, 2, vec![0; 12]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidTextureData { .. }));
    }

    #[test]
    fn test_rejects_ragged_buffer() {
        assert!(TextureData::uint8(3, 3, vec![0; 10]).is_err());
        assert!(matches!(
            TextureData::uint8(0, 3, vec![]),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_texel_expansion() {
        let data = TextureData::uint8(2, 1, vec![255, 51]).unwrap();
        assert_eq!(data.texel(0, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(data.texel(1, 0), [0.2, 0.0, 0.0, 1.0]);
        // clamped
        assert_eq!(data.texel(9, 9), [0.2, 0.0, 0.0, 1.0]);

        let data = TextureData::float32(1, 1, vec![3.5, -1.0]).unwrap();
        assert_eq!(data.texel(0, 0), [3.5, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_float_bytes() {
        let buffer = RasterBuffer::Float32(vec![1.0, 2.0]);
        assert_eq!(buffer.as_bytes().len(), 8);
    }

    #[test]
    fn test_descriptor_validation() {
        let desc = TextureDescriptor {
            label: "test",
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8Unorm,
            wrap: WrapMode::ClampToEdge,
        };
        assert!(desc.validate_texels(&[0; 16]).is_ok());
        assert!(desc.validate_texels(&[0; 15]).is_err());
    }

    #[test]
    fn test_wrap_for_repeat() {
        assert_eq!(WrapMode::for_repeat(true), WrapMode::Repeat);
        assert_eq!(WrapMode::for_repeat(false), WrapMode::ClampToEdge);
    }
}
