//! The wgpu backend.
//!
//! [`WgpuDevice`] owns a wgpu device and queue, uploads textures, builds one
//! render pipeline per shader assembly and state combination, and encodes each
//! draw call into its own render pass over the current [`RenderTarget`].

use std::collections::HashMap;
use std::sync::Arc;

use isoline_core::logging::targets;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::device::{DeviceId, DrawCall, GpuDevice};
use crate::error::{RenderError, RenderResult};
use crate::parameters::RenderParameters;
use crate::shader::{BindingKind, BindingSlot, ShaderAssembly, UniformValue};
use crate::texture::{Texture, TextureDescriptor};
use crate::uniform_layout::pack_block;

/// Adapter and device selection for [`WgpuDevice::new`].
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Contour layers only sample 2D textures, so WebGL2 limits suffice.
    pub required_limits: wgpu::Limits,
    /// Turns on wgpu's validation and debug labels.
    pub debug_validation: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            debug_validation: cfg!(debug_assertions),
        }
    }
}

/// Backend resource of a wgpu texture.
#[derive(Debug)]
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Where draws are rendered.
#[derive(Debug)]
pub struct RenderTarget {
    /// Color attachment; contents are loaded, not cleared.
    pub color: wgpu::TextureView,
    pub color_format: wgpu::TextureFormat,
    /// Optional depth attachment and its format.
    pub depth: Option<(wgpu::TextureView, wgpu::TextureFormat)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    shader: String,
    parameters: RenderParameters,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
}

#[derive(Debug)]
struct CachedPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

/// A [`GpuDevice`] backed by wgpu.
///
/// Dropping the device releases its placeholder from the process-wide
/// [`PlaceholderTextureCache`](crate::PlaceholderTextureCache), so the
/// cached texture no longer keeps wgpu resources alive. Placeholders in other
/// caches are released with `LayerContext::release_device` or
/// [`PlaceholderTextureCache::release`](crate::PlaceholderTextureCache::release).
#[derive(Debug)]
pub struct WgpuDevice {
    id: DeviceId,
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Mutex<Option<RenderTarget>>,
    pipelines: Mutex<HashMap<PipelineKey, Arc<CachedPipeline>>>,
}

impl WgpuDevice {
    /// Request an adapter and device with the given configuration.
    pub fn new(config: &GraphicsConfig) -> RenderResult<Self> {
        let instance_flags = if config.debug_validation {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::empty()
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            flags: instance_flags,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            target: targets::DEVICE,
            name = adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected graphics adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("isoline-device"),
                required_features: wgpu::Features::empty(),
                required_limits: config.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))?;

        Ok(Self::from_parts(device, queue))
    }

    /// Wrap a device and queue owned by the host application.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let id = DeviceId::next();
        debug!(target: targets::DEVICE, device = id.get(), "created wgpu device");
        Self {
            id,
            device,
            queue,
            target: Mutex::new(None),
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// The wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Set or clear the target subsequent draws render into.
    pub fn set_render_target(&self, target: Option<RenderTarget>) {
        *self.target.lock() = target;
    }

    /// Number of pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.lock().len()
    }

    fn resource<'t>(&self, texture: &'t Texture) -> RenderResult<&'t WgpuTexture> {
        if texture.device() != self.id {
            return Err(RenderError::ForeignTexture(texture.id()));
        }
        texture
            .resource::<WgpuTexture>()
            .ok_or(RenderError::ForeignTexture(texture.id()))
    }

    fn pipeline(
        &self,
        shader: &ShaderAssembly,
        parameters: &RenderParameters,
        target: &RenderTarget,
    ) -> Arc<CachedPipeline> {
        let key = PipelineKey {
            shader: shader.key(),
            parameters: *parameters,
            color_format: target.color_format,
            depth_format: target.depth.as_ref().map(|(_, format)| *format),
        };

        let mut pipelines = self.pipelines.lock();
        if let Some(cached) = pipelines.get(&key) {
            return Arc::clone(cached);
        }

        let cached = Arc::new(self.build_pipeline(shader, parameters, &key));
        debug!(
            target: targets::SHADER,
            shader = key.shader,
            parameters = ?parameters,
            "created render pipeline"
        );
        pipelines.insert(key, Arc::clone(&cached));
        cached
    }

    fn build_pipeline(
        &self,
        shader: &ShaderAssembly,
        parameters: &RenderParameters,
        key: &PipelineKey,
    ) -> CachedPipeline {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label()),
            source: wgpu::ShaderSource::Wgsl(shader.source().into()),
        });

        let entries: Vec<_> = shader
            .binding_slots()
            .iter()
            .map(layout_entry)
            .collect();
        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(shader.label()),
                entries: &entries,
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(shader.label()),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let depth_stencil = key.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: parameters.depth_write,
            depth_compare: parameters.depth_compare(),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(shader.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.color_format,
                        blend: Some(parameters.blend.to_wgpu()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: parameters.cull_mode.to_wgpu(),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        CachedPipeline {
            pipeline,
            bind_group_layout,
        }
    }
}

fn layout_entry(slot: &BindingSlot) -> wgpu::BindGroupLayoutEntry {
    let ty = match slot.kind {
        BindingKind::Uniforms => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        BindingKind::ImageTexture | BindingKind::Texture => wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        BindingKind::ImageSampler | BindingKind::Sampler => {
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering)
        }
    };
    wgpu::BindGroupLayoutEntry {
        binding: slot.binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty,
        count: None,
    }
}

impl GpuDevice for WgpuDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        texels: &[u8],
    ) -> RenderResult<Texture> {
        descriptor.validate_texels(texels)?;

        let size = wgpu::Extent3d {
            width: descriptor.width,
            height: descriptor.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.to_wgpu(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(descriptor.width * descriptor.format.bytes_per_texel()),
                rows_per_image: Some(descriptor.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(descriptor.label),
            address_mode_u: descriptor.wrap.to_wgpu(),
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Texture::new(
            self.id,
            descriptor.clone(),
            WgpuTexture {
                texture,
                view,
                sampler,
            },
        ))
    }

    fn draw(&self, call: &DrawCall<'_>) -> RenderResult<()> {
        let target = self.target.lock();
        let target = target.as_ref().ok_or(RenderError::MissingRenderTarget)?;
        let cached = self.pipeline(call.shader, call.parameters, target);
        let slots = call.shader.binding_slots();

        // Buffers must outlive the bind group entries that borrow them.
        let mut buffers = HashMap::new();
        for slot in &slots {
            if let (BindingKind::Uniforms, Some(module)) = (slot.kind, slot.module) {
                let block = call.inputs.block(module.name).cloned().unwrap_or_default();
                let bytes = pack_block(module, &block)?;
                let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(module.name),
                    size: bytes.len() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.queue.write_buffer(&buffer, 0, &bytes);
                buffers.insert(slot.binding, buffer);
            }
        }

        let image = self.resource(call.image)?;
        let mut entries = Vec::with_capacity(slots.len());
        for slot in &slots {
            let resource = match slot.kind {
                BindingKind::ImageTexture => wgpu::BindingResource::TextureView(&image.view),
                BindingKind::ImageSampler => wgpu::BindingResource::Sampler(&image.sampler),
                BindingKind::Uniforms => match buffers.get(&slot.binding) {
                    Some(buffer) => buffer.as_entire_binding(),
                    None => continue,
                },
                BindingKind::Texture | BindingKind::Sampler => {
                    let (Some(module), Some(field)) = (slot.module, slot.field) else {
                        continue;
                    };
                    let texture = match call.inputs.get(module.name, field) {
                        Some(UniformValue::Texture(texture)) => self.resource(texture)?,
                        _ => {
                            return Err(RenderError::MissingUniform {
                                module: module.name.to_string(),
                                field: field.to_string(),
                            });
                        }
                    };
                    if slot.kind == BindingKind::Texture {
                        wgpu::BindingResource::TextureView(&texture.view)
                    } else {
                        wgpu::BindingResource::Sampler(&texture.sampler)
                    }
                }
            };
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource,
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(call.label),
            layout: &cached.bind_group_layout,
            entries: &entries,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(call.label),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(call.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: target.depth.as_ref().map(|(view, _)| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&cached.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..call.vertex_count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        trace!(
            target: targets::DEVICE,
            device = self.id.get(),
            label = call.label,
            vertices = call.vertex_count,
            "submitted draw"
        );
        Ok(())
    }
}

impl Drop for WgpuDevice {
    fn drop(&mut self) {
        crate::placeholder::release_shared(self.id);
        debug!(target: targets::DEVICE, device = self.id.get(), "released wgpu device");
    }
}

static_assertions::assert_impl_all!(WgpuDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ShaderModule, UniformField, UniformType};

    #[test]
    fn test_graphics_config_default() {
        let config = GraphicsConfig::default();
        assert_eq!(config.backends, wgpu::Backends::PRIMARY);
        assert_eq!(config.debug_validation, cfg!(debug_assertions));
    }

    static LOOKUP: ShaderModule = ShaderModule {
        name: "lookup",
        source: "",
        uniforms: &[
            UniformField::new("scale", UniformType::F32),
            UniformField::new("table", UniformType::Texture),
        ],
    };

    #[test]
    fn test_layout_entries_are_non_filtering() {
        let assembly = ShaderAssembly::new("test", "").with_modules(&[&LOOKUP]);
        let entries: Vec<_> = assembly.binding_slots().iter().map(layout_entry).collect();

        assert_eq!(entries.len(), 6);
        assert!(matches!(
            entries[1].ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering)
        ));
        assert!(matches!(
            entries[4].ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                ..
            }
        ));
        assert!(matches!(entries[3].ty, wgpu::BindingType::Buffer { .. }));
    }
}
