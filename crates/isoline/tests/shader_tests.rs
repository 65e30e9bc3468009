//! The assembled contour program: WGSL validation and GPU rendering.
//!
//! Validation runs everywhere. Rendering requires a GPU; run with:
//! ```
//! cargo test --package isoline --test shader_tests -- --ignored
//! ```

use std::sync::Arc;

use isoline::modules::{CONTOUR_LAYER_SHADER, contour_modules};
use isoline::prelude::*;
use isoline_core::glam::Mat4;
use isoline_render::{GraphicsConfig, RenderTarget, ShaderAssembly, WgpuDevice};

const SIZE: u32 = 64;
const FIELD_MAX: f32 = 100.0;

fn contour_source() -> String {
    ShaderAssembly::new("contour-bitmap", CONTOUR_LAYER_SHADER)
        .with_modules(&contour_modules())
        .source()
}

#[test]
fn test_contour_program_is_valid_wgsl() {
    let source = contour_source();
    let module = naga::front::wgsl::parse_str(&source)
        .unwrap_or_else(|e| panic!("{}", e.emit_to_string(&source)));

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("contour program failed validation: {:?}", e);
    }

    let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(entry_points, vec!["vs_main", "fs_main"]);
}

#[test]
fn test_contour_program_declares_every_module_block() {
    let source = contour_source();
    for name in [
        "ProjectUniforms",
        "BitmapUniforms",
        "RasterUniforms",
        "PaletteUniforms",
        "ContourUniforms",
    ] {
        assert!(source.contains(&format!("struct {}", name)), "missing {}", name);
    }
}

/// A horizontal gradient: the field at pixel column `x` is
/// `(x + 0.5) / SIZE * FIELD_MAX` once the layer fills the target.
fn gradient_field() -> Arc<TextureData> {
    let rows = 4;
    let data = (0..rows)
        .flat_map(|_| (0..SIZE).map(|c| (c as f32 + 0.5) / SIZE as f32 * FIELD_MAX))
        .collect();
    Arc::new(TextureData::float32(SIZE, rows, data).unwrap())
}

fn column_value(x: u32) -> f32 {
    (x as f32 + 0.5) / SIZE as f32 * FIELD_MAX
}

fn distance_to_multiple(value: f32, spacing: f32) -> f32 {
    (value - (value / spacing).round() * spacing).abs()
}

/// Render the layer over the whole Web Mercator square and return the
/// columns of the middle row that received any color.
fn covered_columns(interval: f32, major_interval: f32) -> Vec<u32> {
    let device = Arc::new(WgpuDevice::new(&GraphicsConfig::default()).expect("Failed to init graphics"));
    let texture = device.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test_target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    device.set_render_target(Some(RenderTarget {
        color: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        color_format: wgpu::TextureFormat::Rgba8Unorm,
        depth: None,
    }));

    let ctx = LayerContext::new(device.clone());
    let mut layer = LayerInstance::new(ContourLayer::new());
    layer
        .update(
            &ctx,
            ContourLayerProps::new("gradient")
                .with_image(Some(gradient_field()))
                .with_interpolation(ImageInterpolation::Linear)
                .with_interval(interval)
                .with_major_interval(major_interval)
                .with_width(1.0),
        )
        .unwrap();

    let world = Mat4::orthographic_rh(0.0, 512.0, 512.0, 0.0, -1.0, 1.0);
    let frame = FrameContext::new(Viewport::flat(1.0).with_view_proj(world).with_size(SIZE, SIZE));
    assert!(layer.draw(&ctx, &frame).unwrap().is_drawn());

    let row = read_row(&device, &texture, SIZE / 2);
    row.iter()
        .enumerate()
        .filter(|(_, pixel)| pixel[3] > 0)
        .map(|(x, _)| x as u32)
        .collect()
}

fn read_row(device: &WgpuDevice, texture: &wgpu::Texture, y: u32) -> Vec<[u8; 4]> {
    let bytes_per_row = SIZE * 4;
    let buffer = device.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (bytes_per_row * SIZE) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    device.queue().submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| {});
    device.device().poll(wgpu::Maintain::Wait);
    let data = slice.get_mapped_range();
    let start = (y * bytes_per_row) as usize;
    data[start..start + bytes_per_row as usize]
        .chunks_exact(4)
        .map(|p| [p[0], p[1], p[2], p[3]])
        .collect()
}

#[test]
#[ignore = "requires GPU"]
fn test_zero_intervals_draw_nothing() {
    assert!(covered_columns(0.0, 0.0).is_empty());
}

#[test]
#[ignore = "requires GPU"]
fn test_major_lines_only_when_minor_interval_is_zero() {
    let columns = covered_columns(0.0, 50.0);

    assert!(!columns.is_empty());
    for x in &columns {
        assert!(
            distance_to_multiple(column_value(*x), 50.0) <= 5.0,
            "column {} (value {}) is not on a major line",
            x,
            column_value(*x)
        );
    }
}

#[test]
#[ignore = "requires GPU"]
fn test_minor_lines_fall_between_major_lines() {
    let columns = covered_columns(10.0, 0.0);

    assert!(columns.iter().any(|x| distance_to_multiple(column_value(*x), 50.0) > 10.0));
    for x in &columns {
        assert!(distance_to_multiple(column_value(*x), 10.0) <= 3.0);
    }
}
