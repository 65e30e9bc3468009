//! The shader modules stacked by the bitmap layer and their typed uniforms.
//!
//! Order matters: `bitmap` places the grid over the bounds, `raster` samples
//! and decodes the data, `palette` colors values and `contour` extracts the
//! lines last.

use isoline_core::CoordinateSystem;
use isoline_render::{
    Color, ModuleUniforms, ShaderModule, Texture, UniformBlock, UniformField, UniformType,
};

use crate::props::{ImageInterpolation, ImageType};

/// Geometry placement and final compositing.
pub static BITMAP_MODULE: ShaderModule = ShaderModule {
    name: "bitmap",
    source: include_str!("shaders/bitmap.wgsl"),
    uniforms: &[
        UniformField::new("bounds", UniformType::Vec4),
        UniformField::new("transparent_color", UniformType::Vec4),
        UniformField::new("coordinate_system", UniformType::I32),
        UniformField::new("opacity", UniformType::F32),
        UniformField::new("is_globe", UniformType::Bool),
    ],
};

/// Raster sampling, blending and decoding.
pub static RASTER_MODULE: ShaderModule = ShaderModule {
    name: "raster",
    source: include_str!("shaders/raster.wgsl"),
    uniforms: &[
        UniformField::new("image_texture", UniformType::Texture),
        UniformField::new("image_texture2", UniformType::Texture),
        UniformField::new("image_unscale", UniformType::Vec2),
        UniformField::new("image_smoothing", UniformType::F32),
        UniformField::new("image_interpolation", UniformType::U32),
        UniformField::new("image_weight", UniformType::F32),
        UniformField::new("image_type", UniformType::U32),
        UniformField::new("image_min_value", UniformType::F32),
        UniformField::new("image_max_value", UniformType::F32),
    ],
};

/// Value → color lookup.
pub static PALETTE_MODULE: ShaderModule = ShaderModule {
    name: "palette",
    source: include_str!("shaders/palette.wgsl"),
    uniforms: &[
        UniformField::new("palette_texture", UniformType::Texture),
        UniformField::new("palette_bounds", UniformType::Vec2),
        UniformField::new("palette_color", UniformType::Vec4),
    ],
};

/// Contour line extraction.
pub static CONTOUR_MODULE: ShaderModule = ShaderModule {
    name: "contour",
    source: include_str!("shaders/contour.wgsl"),
    uniforms: &[
        UniformField::new("interval", UniformType::F32),
        UniformField::new("major_interval", UniformType::F32),
        UniformField::new("width", UniformType::F32),
    ],
};

/// Entry points of the bitmap layer's drawable.
pub const CONTOUR_LAYER_SHADER: &str = include_str!("shaders/contour_layer.wgsl");

/// The modules appended to the base drawable, in order.
pub fn contour_modules() -> [&'static ShaderModule; 4] {
    [&BITMAP_MODULE, &RASTER_MODULE, &PALETTE_MODULE, &CONTOUR_MODULE]
}

/// Uniforms of [`BITMAP_MODULE`].
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapUniforms {
    pub is_globe: bool,
    /// `[west, south, east, north]`.
    pub bounds: [f32; 4],
    pub coordinate_system: CoordinateSystem,
    pub transparent_color: Color,
    pub opacity: f32,
}

impl ModuleUniforms for BitmapUniforms {
    fn module() -> &'static ShaderModule {
        &BITMAP_MODULE
    }

    fn to_block(&self) -> UniformBlock {
        UniformBlock::new()
            .with("is_globe", self.is_globe)
            .with("bounds", self.bounds)
            .with("coordinate_system", self.coordinate_system.tag())
            .with("transparent_color", self.transparent_color.to_array())
            .with("opacity", self.opacity)
    }
}

/// Uniforms of [`RASTER_MODULE`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterUniforms {
    pub image_texture: Texture,
    pub image_texture2: Texture,
    pub image_smoothing: f32,
    pub image_interpolation: ImageInterpolation,
    pub image_weight: f32,
    pub image_type: ImageType,
    pub image_unscale: Option<[f32; 2]>,
    pub image_min_value: Option<f32>,
    pub image_max_value: Option<f32>,
}

impl ModuleUniforms for RasterUniforms {
    fn module() -> &'static ShaderModule {
        &RASTER_MODULE
    }

    fn to_block(&self) -> UniformBlock {
        UniformBlock::new()
            .with("image_texture", self.image_texture.clone())
            .with("image_texture2", self.image_texture2.clone())
            .with("image_smoothing", self.image_smoothing)
            .with("image_interpolation", self.image_interpolation.tag())
            .with("image_weight", self.image_weight)
            .with("image_type", self.image_type.tag())
            .with("image_unscale", self.image_unscale.unwrap_or([0.0, 0.0]))
            .with("image_min_value", self.image_min_value.unwrap_or(-f32::MAX))
            .with("image_max_value", self.image_max_value.unwrap_or(f32::MAX))
    }
}

/// Uniforms of [`PALETTE_MODULE`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteUniforms {
    pub palette_texture: Texture,
    /// `None` selects the flat `palette_color`.
    pub palette_bounds: Option<[f32; 2]>,
    pub palette_color: Color,
}

impl ModuleUniforms for PaletteUniforms {
    fn module() -> &'static ShaderModule {
        &PALETTE_MODULE
    }

    fn to_block(&self) -> UniformBlock {
        UniformBlock::new()
            .with("palette_texture", self.palette_texture.clone())
            .with("palette_bounds", self.palette_bounds.unwrap_or([0.0, 0.0]))
            .with("palette_color", self.palette_color.to_array())
    }
}

/// Uniforms of [`CONTOUR_MODULE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourUniforms {
    pub interval: f32,
    pub major_interval: f32,
    pub width: f32,
}

impl ModuleUniforms for ContourUniforms {
    fn module() -> &'static ShaderModule {
        &CONTOUR_MODULE
    }

    fn to_block(&self) -> UniformBlock {
        UniformBlock::new()
            .with("interval", self.interval)
            .with("major_interval", self.major_interval)
            .with("width", self.width)
    }
}

#[cfg(test)]
mod tests {
    use isoline_render::uniform_layout::{block_size, pack_block};
    use isoline_render::{ShaderAssembly, ShaderInputs, UniformValue};

    use super::*;

    #[test]
    fn test_contour_block_round_trip() {
        let uniforms = ContourUniforms {
            interval: 5.0,
            major_interval: 25.0,
            width: 2.0,
        };
        let mut inputs = ShaderInputs::new(&contour_modules());
        inputs.set(&uniforms).unwrap();

        let block = inputs.block("contour").unwrap();
        assert_eq!(block.get("interval"), Some(&UniformValue::F32(5.0)));
        assert_eq!(block.get("major_interval"), Some(&UniformValue::F32(25.0)));
        assert_eq!(block.get("width"), Some(&UniformValue::F32(2.0)));
        assert_eq!(block.len(), 3);

        let bytes = pack_block(&CONTOUR_MODULE, block).unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_module_order() {
        let assembly = ShaderAssembly::new("contour-bitmap", CONTOUR_LAYER_SHADER)
            .with_modules(&contour_modules());
        assert_eq!(
            assembly.module_names(),
            vec!["project", "bitmap", "raster", "palette", "contour"]
        );
    }

    #[test]
    fn test_generated_wgsl_declares_module_bindings() {
        let assembly = ShaderAssembly::new("contour-bitmap", CONTOUR_LAYER_SHADER)
            .with_modules(&contour_modules());
        let source = assembly.source();

        for name in [
            "var<uniform> bitmap: BitmapUniforms;",
            "var<uniform> raster: RasterUniforms;",
            "var raster_image_texture2: texture_2d<f32>;",
            "var palette_palette_texture_sampler: sampler;",
            "var<uniform> contour: ContourUniforms;",
            "fn vs_main",
            "fn fs_main",
        ] {
            assert!(source.contains(name), "missing `{name}`");
        }
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(block_size(&BITMAP_MODULE), 48);
        assert_eq!(block_size(&PALETTE_MODULE), 32);
        assert_eq!(block_size(&CONTOUR_MODULE), 16);
    }
}
