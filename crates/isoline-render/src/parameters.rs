//! Fixed-function render state and layered overrides.

/// Which triangle faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// Draw both faces.
    #[default]
    None,
    Front,
    Back,
}

impl CullMode {
    /// The matching wgpu face, if any.
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

/// How fragment output is combined with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Source-over with premultiplied alpha.
    #[default]
    Normal,
    /// `src + dst`.
    Additive,
    /// Overwrite the target.
    Replace,
}

impl BlendMode {
    /// The matching wgpu blend state.
    pub fn to_wgpu(self) -> wgpu::BlendState {
        use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

        match self {
            BlendMode::Normal => BlendState::PREMULTIPLIED_ALPHA_BLENDING,
            BlendMode::Additive => {
                let add = BlendComponent {
                    src_factor: BlendFactor::One,
                    dst_factor: BlendFactor::One,
                    operation: BlendOperation::Add,
                };
                BlendState {
                    color: add,
                    alpha: add,
                }
            }
            BlendMode::Replace => BlendState::REPLACE,
        }
    }
}

/// Fixed-function state of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderParameters {
    pub cull_mode: CullMode,
    /// Compare fragments against the depth buffer.
    pub depth_test: bool,
    /// Write fragment depth.
    pub depth_write: bool,
    pub blend: BlendMode,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::None,
            depth_test: true,
            depth_write: true,
            blend: BlendMode::Normal,
        }
    }
}

impl RenderParameters {
    /// Apply overrides on top of these parameters.
    pub fn with_overrides(self, overrides: &RenderParameterOverrides) -> Self {
        overrides.apply_to(self)
    }

    /// The wgpu depth compare function.
    pub fn depth_compare(&self) -> wgpu::CompareFunction {
        if self.depth_test {
            wgpu::CompareFunction::LessEqual
        } else {
            wgpu::CompareFunction::Always
        }
    }
}

/// A partial set of render parameters. `None` fields leave the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderParameterOverrides {
    pub cull_mode: Option<CullMode>,
    pub depth_test: Option<bool>,
    pub depth_write: Option<bool>,
    pub blend: Option<BlendMode>,
}

impl RenderParameterOverrides {
    /// No overrides.
    pub const NONE: Self = Self {
        cull_mode: None,
        depth_test: None,
        depth_write: None,
        blend: None,
    };

    pub fn cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = Some(cull_mode);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = Some(enabled);
        self
    }

    pub fn depth_write(mut self, enabled: bool) -> Self {
        self.depth_write = Some(enabled);
        self
    }

    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = Some(blend);
        self
    }

    /// Layer `self` over `base`; set fields of `self` win.
    pub fn merge(self, base: Self) -> Self {
        Self {
            cull_mode: self.cull_mode.or(base.cull_mode),
            depth_test: self.depth_test.or(base.depth_test),
            depth_write: self.depth_write.or(base.depth_write),
            blend: self.blend.or(base.blend),
        }
    }

    /// Resolve against complete parameters.
    pub fn apply_to(&self, base: RenderParameters) -> RenderParameters {
        RenderParameters {
            cull_mode: self.cull_mode.unwrap_or(base.cull_mode),
            depth_test: self.depth_test.unwrap_or(base.depth_test),
            depth_write: self.depth_write.unwrap_or(base.depth_write),
            blend: self.blend.unwrap_or(base.blend),
        }
    }
}
