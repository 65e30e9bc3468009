//! Composable shader modules and their uniform blocks.
//!
//! A [`ShaderModule`] is a named unit of WGSL plus the schema of its uniform
//! block. A [`ShaderAssembly`] stacks modules in order on top of the base
//! drawable's modules and an entry-point source, and generates the WGSL
//! binding declarations for all of them. [`ShaderInputs`] holds the current
//! [`UniformBlock`] of each module, keyed by module name.
//!
//! # Generated bindings
//!
//! All resources live in bind group 0. Binding 0 and 1 hold the image texture
//! and sampler passed explicitly with each draw call. Then, for every module
//! in order: one uniform buffer for its scalar fields (if it has any),
//! followed by a texture and sampler pair for each texture field. WGSL names
//! are `<module>` for the uniform struct instance and `<module>_<field>` /
//! `<module>_<field>_sampler` for textures.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{RenderError, RenderResult};
use crate::texture::Texture;

/// Default number of grid columns the bitmap geometry is tessellated into.
pub const DEFAULT_GRID_COLUMNS: u32 = 64;

/// Default number of grid rows the bitmap geometry is tessellated into.
pub const DEFAULT_GRID_ROWS: u32 = 32;

/// WGSL type of a uniform field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    /// Stored as `u32` (0 or 1); WGSL has no host-shareable bool.
    Bool,
    I32,
    U32,
    F32,
    Vec2,
    Vec4,
    Mat4,
    /// A `texture_2d<f32>` plus its sampler.
    Texture,
}

impl UniformType {
    /// WGSL spelling of the type.
    pub const fn wgsl(self) -> &'static str {
        match self {
            UniformType::Bool | UniformType::U32 => "u32",
            UniformType::I32 => "i32",
            UniformType::F32 => "f32",
            UniformType::Vec2 => "vec2<f32>",
            UniformType::Vec4 => "vec4<f32>",
            UniformType::Mat4 => "mat4x4<f32>",
            UniformType::Texture => "texture_2d<f32>",
        }
    }

    /// Alignment in a uniform buffer, in bytes.
    pub const fn align(self) -> usize {
        match self {
            UniformType::Bool | UniformType::I32 | UniformType::U32 | UniformType::F32 => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec4 | UniformType::Mat4 => 16,
            UniformType::Texture => 0,
        }
    }

    /// Size in a uniform buffer, in bytes.
    pub const fn size(self) -> usize {
        match self {
            UniformType::Bool | UniformType::I32 | UniformType::U32 | UniformType::F32 => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
            UniformType::Texture => 0,
        }
    }
}

/// One field of a module's uniform schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformField {
    pub name: &'static str,
    pub ty: UniformType,
}

impl UniformField {
    /// Create a field.
    pub const fn new(name: &'static str, ty: UniformType) -> Self {
        Self { name, ty }
    }
}

/// A named unit of shader code plus its uniform schema.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ShaderModule {
    /// Stable name; the uniform-block key and the WGSL instance name.
    pub name: &'static str,
    /// WGSL functions the module contributes.
    pub source: &'static str,
    /// Uniform fields in declaration order.
    pub uniforms: &'static [UniformField],
}

impl ShaderModule {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.uniforms.iter().find(|f| f.name == name)
    }

    /// Fields stored in the module's uniform buffer.
    pub fn buffer_fields(&self) -> impl Iterator<Item = &UniformField> {
        self.uniforms.iter().filter(|f| f.ty != UniformType::Texture)
    }

    /// Fields bound as textures.
    pub fn texture_fields(&self) -> impl Iterator<Item = &UniformField> {
        self.uniforms.iter().filter(|f| f.ty == UniformType::Texture)
    }

    /// Whether the module needs a uniform buffer.
    pub fn has_buffer(&self) -> bool {
        self.buffer_fields().next().is_some()
    }

    /// WGSL struct name, e.g. `RasterUniforms` for `raster`.
    pub fn struct_name(&self) -> String {
        let mut name = String::with_capacity(self.name.len() + 8);
        let mut upper = true;
        for c in self.name.chars() {
            if c == '_' {
                upper = true;
                continue;
            }
            if upper {
                name.extend(c.to_uppercase());
                upper = false;
            } else {
                name.push(c);
            }
        }
        name.push_str("Uniforms");
        name
    }
}

/// The base module every drawable carries: viewport projection.
pub static PROJECT_MODULE: ShaderModule = ShaderModule {
    name: "project",
    source: include_str!("shaders/project.wgsl"),
    uniforms: &[
        UniformField::new("view_proj", UniformType::Mat4),
        UniformField::new("viewport_size", UniformType::Vec2),
        UniformField::new("zoom", UniformType::F32),
        UniformField::new("globe_radius", UniformType::F32),
        UniformField::new("is_globe", UniformType::Bool),
    ],
};

/// A uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
    Texture(Texture),
}

impl UniformValue {
    /// The schema type this value satisfies.
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Bool(_) => UniformType::Bool,
            UniformValue::I32(_) => UniformType::I32,
            UniformValue::U32(_) => UniformType::U32,
            UniformValue::F32(_) => UniformType::F32,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Texture(_) => UniformType::Texture,
        }
    }

    /// The value as `f32`, if it is one.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            UniformValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a texture, if it is one.
    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            UniformValue::Texture(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::I32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Texture> for UniformValue {
    fn from(v: Texture) -> Self {
        UniformValue::Texture(v)
    }
}

/// Named uniform values for one module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    values: Vec<(&'static str, UniformValue)>,
}

impl UniformBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value, builder style.
    pub fn with(mut self, name: &'static str, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a value.
    pub fn set(&mut self, name: &'static str, value: impl Into<UniformValue>) {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Iterate values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &UniformValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Typed uniforms of one shader module.
pub trait ModuleUniforms {
    /// The module these uniforms feed.
    fn module() -> &'static ShaderModule;

    /// Convert into a block keyed by the module's field names.
    fn to_block(&self) -> UniformBlock;
}

/// Current uniform blocks of every module in an assembly.
#[derive(Debug, Clone, Default)]
pub struct ShaderInputs {
    modules: Vec<&'static ShaderModule>,
    blocks: HashMap<&'static str, UniformBlock>,
}

impl ShaderInputs {
    /// Create empty inputs for a module list.
    pub fn new(modules: &[&'static ShaderModule]) -> Self {
        Self {
            modules: modules.to_vec(),
            blocks: HashMap::new(),
        }
    }

    fn module(&self, name: &str) -> RenderResult<&'static ShaderModule> {
        self.modules
            .iter()
            .copied()
            .find(|m| m.name == name)
            .ok_or_else(|| RenderError::UnknownModule(name.to_string()))
    }

    /// Merge blocks into the current inputs.
    ///
    /// Values are checked against each module's schema before anything is
    /// written, so a failed call leaves the inputs unchanged. Fields not
    /// mentioned keep their previous value.
    pub fn set_props<I>(&mut self, props: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = (&'static str, UniformBlock)>,
    {
        let props: Vec<_> = props.into_iter().collect();

        for (module_name, block) in &props {
            let module = self.module(module_name)?;
            for (field_name, value) in block.iter() {
                let field = module.field(field_name).ok_or_else(|| RenderError::UniformMismatch {
                    module: module.name.to_string(),
                    field: field_name.to_string(),
                    reason: "not declared by the module".to_string(),
                })?;
                if field.ty != value.ty() {
                    return Err(RenderError::UniformMismatch {
                        module: module.name.to_string(),
                        field: field_name.to_string(),
                        reason: format!("expected {:?}, got {:?}", field.ty, value.ty()),
                    });
                }
            }
        }

        for (module_name, block) in props {
            let current = self.blocks.entry(module_name).or_default();
            for (field_name, value) in block.values {
                current.set(field_name, value);
            }
        }
        Ok(())
    }

    /// Set the typed uniforms of one module.
    pub fn set<U: ModuleUniforms>(&mut self, uniforms: &U) -> RenderResult<()> {
        self.set_props([(U::module().name, uniforms.to_block())])
    }

    /// The current block of a module.
    pub fn block(&self, module: &str) -> Option<&UniformBlock> {
        self.blocks.get(module)
    }

    /// One value of one module.
    pub fn get(&self, module: &str, field: &str) -> Option<&UniformValue> {
        self.blocks.get(module)?.get(field)
    }

    /// Check that every declared field of every module has a value.
    pub fn ensure_complete(&self) -> RenderResult<()> {
        for module in &self.modules {
            for field in module.uniforms {
                if self.get(module.name, field.name).is_none() {
                    return Err(RenderError::MissingUniform {
                        module: module.name.to_string(),
                        field: field.name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// What a binding slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// The per-draw image texture.
    ImageTexture,
    /// The per-draw image sampler.
    ImageSampler,
    /// A module's uniform buffer.
    Uniforms,
    /// A module's texture field.
    Texture,
    /// The sampler of a module's texture field.
    Sampler,
}

/// One binding in group 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub binding: u32,
    pub kind: BindingKind,
    /// Owning module; `None` for the image slots.
    pub module: Option<&'static ShaderModule>,
    /// Texture field name for texture and sampler slots.
    pub field: Option<&'static str>,
}

/// An ordered stack of shader modules plus the drawable's entry points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderAssembly {
    label: &'static str,
    modules: Vec<&'static ShaderModule>,
    entry_source: &'static str,
    grid: (u32, u32),
}

impl ShaderAssembly {
    /// The base drawable's assembly: the projection module and `entry_source`,
    /// which must define `vs_main` and `fs_main`.
    pub fn new(label: &'static str, entry_source: &'static str) -> Self {
        Self {
            label,
            modules: vec![&PROJECT_MODULE],
            entry_source,
            grid: (DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
        }
    }

    /// Append modules after the current ones; modules already present are
    /// skipped.
    pub fn with_modules(mut self, modules: &[&'static ShaderModule]) -> Self {
        for module in modules {
            if !self.modules.iter().any(|m| m.name == module.name) {
                self.modules.push(module);
            }
        }
        self
    }

    /// Set the geometry grid resolution.
    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.grid = (columns.max(1), rows.max(1));
        self
    }

    /// Debug label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Modules in order.
    pub fn modules(&self) -> &[&'static ShaderModule] {
        &self.modules
    }

    /// Module names in order.
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    /// Grid resolution as `(columns, rows)`.
    pub fn grid(&self) -> (u32, u32) {
        self.grid
    }

    /// Vertices needed for the grid: two triangles per cell.
    pub fn vertex_count(&self) -> u32 {
        self.grid.0 * self.grid.1 * 6
    }

    /// The bindings of group 0, in binding order.
    pub fn binding_slots(&self) -> Vec<BindingSlot> {
        let mut slots = vec![
            BindingSlot {
                binding: 0,
                kind: BindingKind::ImageTexture,
                module: None,
                field: None,
            },
            BindingSlot {
                binding: 1,
                kind: BindingKind::ImageSampler,
                module: None,
                field: None,
            },
        ];

        let mut binding = 2;
        for module in &self.modules {
            if module.has_buffer() {
                slots.push(BindingSlot {
                    binding,
                    kind: BindingKind::Uniforms,
                    module: Some(module),
                    field: None,
                });
                binding += 1;
            }
            for field in module.texture_fields() {
                for kind in [BindingKind::Texture, BindingKind::Sampler] {
                    slots.push(BindingSlot {
                        binding,
                        kind,
                        module: Some(module),
                        field: Some(field.name),
                    });
                    binding += 1;
                }
            }
        }
        slots
    }

    /// Generate the complete WGSL source.
    pub fn source(&self) -> String {
        let mut out = String::new();
        let (columns, rows) = self.grid;
        let _ = writeln!(out, "// {} ({})", self.label, self.module_names().join(", "));
        let _ = writeln!(out, "const GRID_COLUMNS: u32 = {columns}u;");
        let _ = writeln!(out, "const GRID_ROWS: u32 = {rows}u;");
        out.push('\n');

        for module in &self.modules {
            if !module.has_buffer() {
                continue;
            }
            let _ = writeln!(out, "struct {} {{", module.struct_name());
            for field in module.buffer_fields() {
                let _ = writeln!(out, "    {}: {},", field.name, field.ty.wgsl());
            }
            out.push_str("};\n\n");
        }

        for slot in self.binding_slots() {
            let decl = match (slot.kind, slot.module, slot.field) {
                (BindingKind::ImageTexture, _, _) => "var image_texture: texture_2d<f32>".to_string(),
                (BindingKind::ImageSampler, _, _) => "var image_sampler: sampler".to_string(),
                (BindingKind::Uniforms, Some(module), _) => {
                    format!("var<uniform> {}: {}", module.name, module.struct_name())
                }
                (BindingKind::Texture, Some(module), Some(field)) => {
                    format!("var {}_{}: texture_2d<f32>", module.name, field)
                }
                (BindingKind::Sampler, Some(module), Some(field)) => {
                    format!("var {}_{}_sampler: sampler", module.name, field)
                }
                _ => continue,
            };
            let _ = writeln!(out, "@group(0) @binding({}) {};", slot.binding, decl);
        }
        out.push('\n');

        for module in &self.modules {
            let _ = writeln!(out, "// module: {}", module.name);
            out.push_str(module.source);
            out.push('\n');
        }

        out.push_str(self.entry_source);
        out
    }

    /// A key identifying the generated program.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}x{}",
            self.label,
            self.module_names().join("+"),
            self.grid.0,
            self.grid.1
        )
    }
}
