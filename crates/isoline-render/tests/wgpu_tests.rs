//! Integration tests for the wgpu backend.
//!
//! These tests require a GPU. Run with:
//! ```
//! cargo test --package isoline-render -- --ignored
//! ```

use isoline_core::{FrameContext, Viewport};
use isoline_render::{
    GpuDevice, GraphicsConfig, Model, RenderError, RenderParameters, RenderTarget,
    ShaderAssembly, TextureData, WgpuDevice, WgpuTexture, WrapMode, create_texture,
};

const SIZE: u32 = 64;

const FILL_ENTRY: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return textureSampleLevel(image_texture, image_sampler, vec2<f32>(0.5, 0.5), 0.0);
}
"#;

fn device() -> WgpuDevice {
    WgpuDevice::new(&GraphicsConfig::default()).expect("Failed to init graphics")
}

fn target(device: &WgpuDevice) -> (wgpu::Texture, RenderTarget) {
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
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (
        texture,
        RenderTarget {
            color: view,
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            depth: None,
        },
    )
}

fn read_pixel(device: &WgpuDevice, texture: &wgpu::Texture) -> [u8; 4] {
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
    let center = ((SIZE / 2) * bytes_per_row + (SIZE / 2) * 4) as usize;
    [data[center], data[center + 1], data[center + 2], data[center + 3]]
}

#[test]
#[ignore = "requires GPU"]
fn test_create_texture_on_gpu() {
    let device = device();
    let data = TextureData::float32(4, 2, vec![1.0; 8]).unwrap();
    let texture = create_texture(&device, &data, WrapMode::Repeat).unwrap();

    assert_eq!(texture.device(), device.id());
    assert!(texture.resource::<WgpuTexture>().is_some());
}

#[test]
#[ignore = "requires GPU"]
fn test_draw_without_target_fails() {
    let device = device();
    let image = create_texture(
        &device,
        &TextureData::uint8(1, 1, vec![255, 0, 0, 255]).unwrap(),
        WrapMode::ClampToEdge,
    )
    .unwrap();
    let mut model = Model::new(
        "fill",
        ShaderAssembly::new("fill", FILL_ENTRY),
        RenderParameters::default(),
    );

    let frame = FrameContext::new(Viewport::flat(0.0));
    let err = model.draw(&device, &frame, &image).unwrap_err();
    assert!(matches!(err, RenderError::MissingRenderTarget));
}

#[test]
#[ignore = "requires GPU"]
fn test_draw_samples_image() {
    let device = device();
    let (texture, target) = target(&device);
    device.set_render_target(Some(target));

    let image = create_texture(
        &device,
        &TextureData::uint8(1, 1, vec![255, 0, 0, 255]).unwrap(),
        WrapMode::ClampToEdge,
    )
    .unwrap();
    let mut model = Model::new(
        "fill",
        ShaderAssembly::new("fill", FILL_ENTRY).with_grid(1, 1),
        RenderParameters::default(),
    );

    let frame = FrameContext::new(Viewport::flat(0.0).with_size(SIZE, SIZE));
    model.draw(&device, &frame, &image).unwrap();
    model.draw(&device, &frame, &image).unwrap();

    assert_eq!(device.pipeline_count(), 1);
    assert_eq!(read_pixel(&device, &texture), [255, 0, 0, 255]);
}
