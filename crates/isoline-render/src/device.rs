//! The device abstraction layers render through.
//!
//! Layers never talk to wgpu directly. They create textures and issue draw
//! calls through [`GpuDevice`], which is implemented by
//! [`WgpuDevice`](crate::WgpuDevice) for real rendering and by
//! [`HeadlessDevice`](crate::HeadlessDevice) for recording without a GPU.

use std::sync::atomic::{AtomicU64, Ordering};

use isoline_core::FrameContext;

use crate::error::RenderResult;
use crate::parameters::RenderParameters;
use crate::shader::{ShaderAssembly, ShaderInputs};
use crate::texture::{Texture, TextureDescriptor};

/// Global device ID counter.
static DEVICE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a device, used to key per-device caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    /// Allocate a fresh ID.
    pub fn next() -> Self {
        Self(DEVICE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One draw of a model.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Debug label, usually the model ID.
    pub label: &'a str,
    /// Shader modules and entry points.
    pub shader: &'a ShaderAssembly,
    /// Fixed-function state.
    pub parameters: &'a RenderParameters,
    /// Uniform blocks for every module in `shader`.
    pub inputs: &'a ShaderInputs,
    /// The image bound to the base drawable's texture slot for this draw only.
    pub image: &'a Texture,
    /// Vertices to draw.
    pub vertex_count: u32,
    /// The frame being rendered.
    pub frame: &'a FrameContext,
}

/// A GPU that can hold textures and execute draw calls.
///
/// Calls block until the resource is ready to bind; backends may queue the
/// actual work internally.
pub trait GpuDevice: Send + Sync {
    /// Identity of this device.
    fn id(&self) -> DeviceId;

    /// Create a texture and upload `texels`, which must match the descriptor.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        texels: &[u8],
    ) -> RenderResult<Texture>;

    /// Execute one draw call.
    fn draw(&self, call: &DrawCall<'_>) -> RenderResult<()>;
}
