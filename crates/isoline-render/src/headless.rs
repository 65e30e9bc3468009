//! A device that records work instead of executing it.
//!
//! `HeadlessDevice` validates uploads and draw calls the same way the wgpu
//! backend does (texel lengths, texture ownership, uniform packing) and keeps
//! a log of what was created and drawn. It lets layers run in environments
//! without a GPU and makes their GPU traffic observable in tests.

use isoline_core::logging::targets;
use parking_lot::Mutex;
use tracing::trace;

use crate::device::{DeviceId, DrawCall, GpuDevice};
use crate::error::{RenderError, RenderResult};
use crate::parameters::RenderParameters;
use crate::shader::{ShaderInputs, UniformValue};
use crate::texture::{Texture, TextureDescriptor, TextureId};
use crate::uniform_layout::pack_block;

/// Backend resource of a headless texture: a copy of the uploaded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTexture {
    pub texels: Vec<u8>,
}

/// A texture creation seen by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub id: TextureId,
    pub descriptor: TextureDescriptor,
}

/// A draw call seen by the device.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub label: String,
    pub modules: Vec<&'static str>,
    pub parameters: RenderParameters,
    pub inputs: ShaderInputs,
    pub image: TextureId,
    pub vertex_count: u32,
    pub zoom: f64,
    /// Packed uniform buffers, one per module with a buffer, in module order.
    pub uniform_bytes: Vec<(&'static str, Vec<u8>)>,
}

impl DrawRecord {
    /// The texture bound to a module's texture field.
    pub fn texture(&self, module: &str, field: &str) -> Option<TextureId> {
        self.inputs
            .get(module, field)
            .and_then(UniformValue::as_texture)
            .map(Texture::id)
    }
}

/// A recording device.
#[derive(Debug)]
pub struct HeadlessDevice {
    id: DeviceId,
    textures: Mutex<Vec<TextureRecord>>,
    draws: Mutex<Vec<DrawRecord>>,
}

impl HeadlessDevice {
    /// Create a device with a fresh ID.
    pub fn new() -> Self {
        Self {
            id: DeviceId::next(),
            textures: Mutex::new(Vec::new()),
            draws: Mutex::new(Vec::new()),
        }
    }

    /// Number of textures created so far.
    pub fn textures_created(&self) -> usize {
        self.textures.lock().len()
    }

    /// Every texture creation, oldest first.
    pub fn texture_records(&self) -> Vec<TextureRecord> {
        self.textures.lock().clone()
    }

    /// Every draw, oldest first.
    pub fn draws(&self) -> Vec<DrawRecord> {
        self.draws.lock().clone()
    }

    /// Number of draws so far.
    pub fn draw_count(&self) -> usize {
        self.draws.lock().len()
    }

    /// The most recent draw.
    pub fn last_draw(&self) -> Option<DrawRecord> {
        self.draws.lock().last().cloned()
    }

    /// Forget recorded draws and textures.
    pub fn clear(&self) {
        self.textures.lock().clear();
        self.draws.lock().clear();
    }

    fn check_owned(&self, texture: &Texture) -> RenderResult<()> {
        if texture.device() != self.id || texture.resource::<HeadlessTexture>().is_none() {
            return Err(RenderError::ForeignTexture(texture.id()));
        }
        Ok(())
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HeadlessDevice {
    fn drop(&mut self) {
        crate::placeholder::release_shared(self.id);
    }
}

impl GpuDevice for HeadlessDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        texels: &[u8],
    ) -> RenderResult<Texture> {
        descriptor.validate_texels(texels)?;

        let texture = Texture::new(
            self.id,
            descriptor.clone(),
            HeadlessTexture {
                texels: texels.to_vec(),
            },
        );
        self.textures.lock().push(TextureRecord {
            id: texture.id(),
            descriptor: descriptor.clone(),
        });
        Ok(texture)
    }

    fn draw(&self, call: &DrawCall<'_>) -> RenderResult<()> {
        self.check_owned(call.image)?;

        let mut uniform_bytes = Vec::new();
        for module in call.shader.modules() {
            let block = call.inputs.block(module.name).cloned().unwrap_or_default();
            for field in module.texture_fields() {
                match block.get(field.name) {
                    Some(UniformValue::Texture(texture)) => self.check_owned(texture)?,
                    _ => {
                        return Err(RenderError::MissingUniform {
                            module: module.name.to_string(),
                            field: field.name.to_string(),
                        });
                    }
                }
            }
            if module.has_buffer() {
                uniform_bytes.push((module.name, pack_block(module, &block)?));
            }
        }

        trace!(
            target: targets::DEVICE,
            device = self.id.get(),
            label = call.label,
            vertices = call.vertex_count,
            "recorded draw"
        );

        self.draws.lock().push(DrawRecord {
            label: call.label.to_string(),
            modules: call.shader.module_names(),
            parameters: *call.parameters,
            inputs: call.inputs.clone(),
            image: call.image.id(),
            vertex_count: call.vertex_count,
            zoom: call.frame.viewport.zoom,
            uniform_bytes,
        });
        Ok(())
    }
}

static_assertions::assert_impl_all!(HeadlessDevice: Send, Sync);
