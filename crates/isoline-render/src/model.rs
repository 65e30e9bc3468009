//! A drawable: shader assembly, render state and current uniforms.

use isoline_core::{FrameContext, GLOBE_RADIUS, is_globe_projection};

use crate::device::{DrawCall, GpuDevice};
use crate::error::RenderResult;
use crate::parameters::RenderParameters;
use crate::shader::{PROJECT_MODULE, ShaderAssembly, ShaderInputs, UniformBlock, UniformValue};
use crate::texture::Texture;

/// A drawable owned by a layer.
///
/// The model keeps uniform blocks across frames; layers update only the
/// blocks whose inputs changed and the model fills in the projection block
/// from the frame on every draw.
#[derive(Debug, Clone)]
pub struct Model {
    id: String,
    shader: ShaderAssembly,
    parameters: RenderParameters,
    inputs: ShaderInputs,
}

impl Model {
    /// Create a model.
    pub fn new(id: impl Into<String>, shader: ShaderAssembly, parameters: RenderParameters) -> Self {
        let inputs = ShaderInputs::new(shader.modules());
        Self {
            id: id.into(),
            shader,
            parameters,
            inputs,
        }
    }

    /// The model ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The shader assembly.
    pub fn shader(&self) -> &ShaderAssembly {
        &self.shader
    }

    /// Current render parameters.
    pub fn parameters(&self) -> &RenderParameters {
        &self.parameters
    }

    /// Replace the render parameters.
    pub fn set_parameters(&mut self, parameters: RenderParameters) {
        self.parameters = parameters;
    }

    /// Current uniform inputs.
    pub fn inputs(&self) -> &ShaderInputs {
        &self.inputs
    }

    /// Mutable access to the uniform inputs.
    pub fn shader_inputs_mut(&mut self) -> &mut ShaderInputs {
        &mut self.inputs
    }

    /// Draw with `image` bound to the image slot for this call.
    pub fn draw(
        &mut self,
        device: &dyn GpuDevice,
        frame: &FrameContext,
        image: &Texture,
    ) -> RenderResult<()> {
        let viewport = &frame.viewport;
        self.inputs.set_props([(
            PROJECT_MODULE.name,
            UniformBlock::new()
                .with(
                    "view_proj",
                    UniformValue::Mat4(viewport.view_proj.to_cols_array()),
                )
                .with("viewport_size", [viewport.width as f32, viewport.height as f32])
                .with("zoom", viewport.zoom as f32)
                .with("globe_radius", GLOBE_RADIUS)
                .with("is_globe", is_globe_projection(viewport)),
        )])?;
        self.inputs.ensure_complete()?;

        device.draw(&DrawCall {
            label: &self.id,
            shader: &self.shader,
            parameters: &self.parameters,
            inputs: &self.inputs,
            image,
            vertex_count: self.shader.vertex_count(),
            frame,
        })
    }
}
