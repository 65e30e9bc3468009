//! Palette color ramps as 1D textures.
//!
//! A palette is rasterized into a single row of [`PALETTE_WIDTH`] texels
//! spanning the palette's value bounds. The shader maps a value `v` to
//! `(v - min) / (max - min)` and samples the texel centre of that position.

use isoline_core::logging::targets;
use isoline_render::{GpuDevice, Texture, TextureDescriptor, TextureFormat, WrapMode};
use tracing::debug;

use crate::Result;
use crate::palette::Palette;

/// Width of the palette ramp in texels.
/// 256 texels resolves 8-bit data exactly and keeps float ramps smooth.
pub const PALETTE_WIDTH: u32 = 256;

/// A palette uploaded to the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteTexture {
    /// The 256×1 RGBA8 ramp.
    pub texture: Texture,
    /// `[min, max]` stop values the ramp spans.
    pub bounds: [f32; 2],
}

/// Rasterize a palette into premultiplied RGBA8 texels.
pub fn palette_texels(palette: &Palette) -> Vec<u8> {
    let (min, max) = palette.bounds();
    let mut texels = Vec::with_capacity(PALETTE_WIDTH as usize * 4);
    for x in 0..PALETTE_WIDTH {
        let t = x as f32 / (PALETTE_WIDTH - 1) as f32;
        let color = palette.color_at(min + (max - min) * t);
        texels.extend_from_slice(&color.to_rgba8());
    }
    texels
}

/// Upload a palette ramp.
pub fn create_palette_texture(device: &dyn GpuDevice, palette: &Palette) -> Result<PaletteTexture> {
    let descriptor = TextureDescriptor {
        label: "palette",
        width: PALETTE_WIDTH,
        height: 1,
        format: TextureFormat::Rgba8Unorm,
        wrap: WrapMode::ClampToEdge,
    };
    let texture = device.create_texture(&descriptor, &palette_texels(palette))?;
    let (min, max) = palette.bounds();

    debug!(
        target: targets::PALETTE,
        texture = texture.id().get(),
        min,
        max,
        "created palette texture"
    );

    Ok(PaletteTexture {
        texture,
        bounds: [min, max],
    })
}
