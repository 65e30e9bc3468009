//! Byte layout of module uniform buffers.
//!
//! Uniform structs follow WGSL's uniform address space rules: scalars align to
//! 4 bytes, `vec2` to 8, `vec4` and `mat4x4` to 16, and the struct size is
//! rounded up to 16.

use crate::error::{RenderError, RenderResult};
use crate::shader::{ShaderModule, UniformBlock, UniformValue};

/// Alignment of a uniform struct.
const STRUCT_ALIGN: usize = 16;

#[inline]
fn align_to(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

/// Byte offset of every buffer field plus the padded struct size.
pub fn field_offsets(module: &ShaderModule) -> (Vec<(&'static str, usize)>, usize) {
    let mut offset = 0;
    let mut offsets = Vec::new();
    for field in module.buffer_fields() {
        offset = align_to(offset, field.ty.align());
        offsets.push((field.name, offset));
        offset += field.ty.size();
    }
    (offsets, align_to(offset.max(1), STRUCT_ALIGN))
}

/// Pack a module's block into uniform buffer bytes.
pub fn pack_block(module: &ShaderModule, block: &UniformBlock) -> RenderResult<Vec<u8>> {
    let (offsets, size) = field_offsets(module);
    let mut bytes = vec![0u8; size];

    for (name, offset) in offsets {
        let value = block.get(name).ok_or_else(|| RenderError::MissingUniform {
            module: module.name.to_string(),
            field: name.to_string(),
        })?;
        write_value(&mut bytes[offset..], value);
    }
    Ok(bytes)
}

fn write_value(dst: &mut [u8], value: &UniformValue) {
    let mut put = |src: &[u8]| dst[..src.len()].copy_from_slice(src);
    match value {
        UniformValue::Bool(v) => put(&u32::from(*v).to_ne_bytes()),
        UniformValue::I32(v) => put(&v.to_ne_bytes()),
        UniformValue::U32(v) => put(&v.to_ne_bytes()),
        UniformValue::F32(v) => put(&v.to_ne_bytes()),
        UniformValue::Vec2(v) => put(bytemuck::cast_slice(v.as_slice())),
        UniformValue::Vec4(v) => put(bytemuck::cast_slice(v.as_slice())),
        UniformValue::Mat4(v) => put(bytemuck::cast_slice(v.as_slice())),
        UniformValue::Texture(_) => {}
    }
}

/// Size of the packed buffer for a module.
pub fn block_size(module: &ShaderModule) -> usize {
    field_offsets(module).1
}
