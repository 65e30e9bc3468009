//! Integration tests for drawing through the headless device.

use std::sync::Arc;

use isoline_core::{FrameContext, Viewport};
use isoline_render::{
    CullMode, HeadlessDevice, Model, ModuleUniforms, PlaceholderTextureCache,
    RenderError, RenderParameterOverrides, RenderParameters, ShaderAssembly, ShaderModule,
    TextureData, UniformBlock, UniformField, UniformType, WrapMode, create_texture,
};

static SHADE: ShaderModule = ShaderModule {
    name: "shade",
    source: "fn shade_amount() -> f32 { return shade.amount; }",
    uniforms: &[
        UniformField::new("amount", UniformType::F32),
        UniformField::new("ramp", UniformType::Texture),
    ],
};

struct ShadeUniforms {
    amount: f32,
    ramp: isoline_render::Texture,
}

impl ModuleUniforms for ShadeUniforms {
    fn module() -> &'static ShaderModule {
        &SHADE
    }

    fn to_block(&self) -> UniformBlock {
        UniformBlock::new()
            .with("amount", self.amount)
            .with("ramp", self.ramp.clone())
    }
}

fn image(device: &HeadlessDevice) -> isoline_render::Texture {
    let data = TextureData::uint8(2, 2, vec![0, 64, 128, 255]).unwrap();
    create_texture(device, &data, WrapMode::ClampToEdge).unwrap()
}

#[test]
fn test_model_draw_records_uniforms() {
    let device = HeadlessDevice::new();
    let placeholders = PlaceholderTextureCache::new();
    let image = image(&device);

    let shader = ShaderAssembly::new("shade", "").with_modules(&[&SHADE]);
    let parameters = RenderParameters::default()
        .with_overrides(&RenderParameterOverrides::default().cull_mode(CullMode::Back));
    let mut model = Model::new("shade-model", shader, parameters);

    let ramp = placeholders.get_or_create(&device).unwrap();
    model
        .shader_inputs_mut()
        .set(&ShadeUniforms {
            amount: 0.25,
            ramp: ramp.clone(),
        })
        .unwrap();

    let frame = FrameContext::new(Viewport::globe(4.0));
    model.draw(&device, &frame, &image).unwrap();

    let draw = device.last_draw().unwrap();
    assert_eq!(draw.parameters.cull_mode, CullMode::Back);
    assert_eq!(draw.texture("shade", "ramp"), Some(ramp.id()));
    assert_eq!(draw.image, image.id());
    assert_eq!(draw.zoom, 4.0);
    assert_eq!(draw.vertex_count, 64 * 32 * 6);

    let (name, bytes) = &draw.uniform_bytes[1];
    assert_eq!(*name, "shade");
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[..4], &0.25f32.to_ne_bytes());

    // is_globe lives at byte 80 of the projection block
    let (name, bytes) = &draw.uniform_bytes[0];
    assert_eq!(*name, "project");
    assert_eq!(&bytes[80..84], &1u32.to_ne_bytes());
}

#[test]
fn test_draw_rejects_texture_from_other_device() {
    let device = HeadlessDevice::new();
    let other = HeadlessDevice::new();
    let placeholders = PlaceholderTextureCache::new();

    let shader = ShaderAssembly::new("shade", "").with_modules(&[&SHADE]);
    let mut model = Model::new("shade-model", shader, RenderParameters::default());
    model
        .shader_inputs_mut()
        .set(&ShadeUniforms {
            amount: 1.0,
            ramp: placeholders.get_or_create(&other).unwrap(),
        })
        .unwrap();

    let frame = FrameContext::new(Viewport::flat(1.0));
    let err = model.draw(&device, &frame, &image(&device)).unwrap_err();
    assert!(matches!(err, RenderError::ForeignTexture(_)));
    assert_eq!(device.draw_count(), 0);
}

#[test]
fn test_placeholder_shared_across_threads() {
    let device = Arc::new(HeadlessDevice::new());
    let cache = Arc::new(PlaceholderTextureCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let device = Arc::clone(&device);
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.get_or_create(device.as_ref()).unwrap().id())
        })
        .collect();

    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(device.textures_created(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(device.texture_records()[0].descriptor.label, "placeholder");
}
