//! Fixed-size payload layouts.
//!
//! Every payload is `#[repr(C)]` and made of 4-byte fields only, so it occupies a whole number of
//! stream words and can be copied in and out with `bytemuck`. Booleans and enums travel as `u32`;
//! enums are validated again when decoded.

use bytemuck::{Pod, Zeroable};

use crate::backend::{
    AttributeType, Blend, BlendFactor, CullOrder, DepthFunc, DrawState, Filter, Primitive,
    TargetAttachment, TargetDesc, TextureFilter, TextureRegion, VertexAttribute, VertexLayout,
    ViewportState, Wrap, MAX_TARGET_ATTACHMENTS, MAX_TEXTURE_LAYERS, MAX_TEX_COORDS,
};
use crate::coords::Rect;
use crate::handle::Handle;

/// A field that failed validation; the reader adds opcode and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldError {
    pub field: &'static str,
    pub value: u32,
}

pub(crate) type FieldResult<T> = Result<T, FieldError>;

fn field<T>(field: &'static str, value: u32, parse: fn(u32) -> Option<T>) -> FieldResult<T> {
    parse(value).ok_or(FieldError { field, value })
}

#[inline]
fn flag(b: bool) -> u32 {
    u32::from(b)
}

// ── frame state ───────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ViewportWire {
    pub viewport: Rect,
    pub scissor: Rect,
    pub scissor_enabled: u32,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub clear_stencil: u32,
    pub target: Handle,
}

impl ViewportWire {
    pub fn encode(state: &ViewportState) -> Self {
        Self {
            viewport: state.viewport,
            scissor: state.scissor.unwrap_or_default(),
            scissor_enabled: flag(state.scissor.is_some()),
            clear_color: state.clear_color,
            clear_depth: state.clear_depth,
            clear_stencil: state.clear_stencil,
            target: state.target,
        }
    }

    pub fn decode(&self) -> ViewportState {
        ViewportState {
            viewport: self.viewport,
            scissor: (self.scissor_enabled != 0).then_some(self.scissor),
            clear_color: self.clear_color,
            clear_depth: self.clear_depth,
            clear_stencil: self.clear_stencil,
            target: self.target,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ClearWire {
    pub viewport: ViewportWire,
    /// bit 0 color, bit 1 depth, bit 2 stencil
    pub flags: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct CameraWire {
    pub modelview: [f32; 16],
    pub projection: [f32; 16],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawWire {
    pub viewport: ViewportWire,
    pub vertex_buffer: Handle,
    pub index_buffer: Handle,
    pub primitive: u32,
    pub index_offset: u32,
    pub index_count: u32,
    pub instance_count: u32,
    pub shader: Handle,
    pub uniform_buffer: Handle,
    pub textures: [Handle; MAX_TEXTURE_LAYERS],
    pub blend_enabled: u32,
    pub blend_src: u32,
    pub blend_dst: u32,
    pub cull_enabled: u32,
    pub cull_order: u32,
    pub depth_enabled: u32,
    pub depth_func: u32,
    pub depth_write: u32,
    pub color_write: u32,
}

impl DrawWire {
    pub fn encode(state: &DrawState) -> Self {
        let blend = state.blend.unwrap_or(Blend::new(BlendFactor::One, BlendFactor::Zero));
        Self {
            viewport: ViewportWire::encode(&state.viewport),
            vertex_buffer: state.vertex_buffer,
            index_buffer: state.index_buffer,
            primitive: state.primitive.to_word(),
            index_offset: state.index_offset,
            index_count: state.index_count,
            instance_count: state.instance_count,
            shader: state.shader,
            uniform_buffer: state.uniform_buffer,
            textures: state.textures,
            blend_enabled: flag(state.blend.is_some()),
            blend_src: blend.src.to_word(),
            blend_dst: blend.dst.to_word(),
            cull_enabled: flag(state.cull.is_some()),
            cull_order: state.cull.unwrap_or(CullOrder::Ccw).to_word(),
            depth_enabled: flag(state.depth_test.is_some()),
            depth_func: state.depth_test.unwrap_or(DepthFunc::LessEqual).to_word(),
            depth_write: flag(state.depth_write),
            color_write: flag(state.color_write),
        }
    }

    pub fn decode(&self) -> FieldResult<DrawState> {
        let blend = if self.blend_enabled != 0 {
            Some(Blend::new(
                field("blend_src", self.blend_src, BlendFactor::from_word)?,
                field("blend_dst", self.blend_dst, BlendFactor::from_word)?,
            ))
        } else {
            None
        };
        let cull = if self.cull_enabled != 0 {
            Some(field("cull_order", self.cull_order, CullOrder::from_word)?)
        } else {
            None
        };
        let depth_test = if self.depth_enabled != 0 {
            Some(field("depth_func", self.depth_func, DepthFunc::from_word)?)
        } else {
            None
        };

        Ok(DrawState {
            viewport: self.viewport.decode(),
            vertex_buffer: self.vertex_buffer,
            index_buffer: self.index_buffer,
            primitive: field("primitive", self.primitive, Primitive::from_word)?,
            index_offset: self.index_offset,
            index_count: self.index_count,
            instance_count: self.instance_count,
            shader: self.shader,
            uniform_buffer: self.uniform_buffer,
            textures: self.textures,
            blend,
            cull,
            depth_test,
            depth_write: self.depth_write != 0,
            color_write: self.color_write != 0,
        })
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct UniformWire {
    pub buffer: Handle,
    pub index: u32,
    /// Number of `f32` values that follow.
    pub count: u32,
}

// ── shaders ───────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ShaderWire {
    pub handle: Handle,
    pub vertex_len: u32,
    pub fragment_len: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct UniformBufferWire {
    pub handle: Handle,
    pub shader: Handle,
}

// ── geometry ──────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct VertexBufferWire {
    pub handle: Handle,
    pub stride: u32,
    pub count: u32,
    pub usage: u32,
}

/// Attribute slots: position, normal, color, then texture coordinates.
const LAYOUT_SLOTS: usize = 3 + MAX_TEX_COORDS;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct VertexLayoutWire {
    pub buffer: Handle,
    /// `offset | dimension << 8 | type << 16` per slot.
    pub attributes: [u32; LAYOUT_SLOTS],
}

fn pack_attribute(a: VertexAttribute) -> u32 {
    u32::from(a.offset) | u32::from(a.dimension) << 8 | a.kind.to_word() << 16
}

fn unpack_attribute(word: u32) -> FieldResult<VertexAttribute> {
    Ok(VertexAttribute {
        offset: (word & 0xFF) as u8,
        dimension: ((word >> 8) & 0xFF) as u8,
        kind: field("attribute_type", word >> 16, AttributeType::from_word)?,
    })
}

impl VertexLayoutWire {
    pub fn encode(buffer: Handle, layout: &VertexLayout) -> Self {
        let mut attributes = [0u32; LAYOUT_SLOTS];
        attributes[0] = pack_attribute(layout.position);
        attributes[1] = pack_attribute(layout.normal);
        attributes[2] = pack_attribute(layout.color);
        for (slot, tc) in attributes[3..].iter_mut().zip(&layout.tex_coords) {
            *slot = pack_attribute(*tc);
        }
        Self { buffer, attributes }
    }

    pub fn decode(&self) -> FieldResult<VertexLayout> {
        let mut tex_coords = [VertexAttribute::DISABLED; MAX_TEX_COORDS];
        for (tc, word) in tex_coords.iter_mut().zip(&self.attributes[3..]) {
            *tc = unpack_attribute(*word)?;
        }
        Ok(VertexLayout {
            position: unpack_attribute(self.attributes[0])?,
            normal: unpack_attribute(self.attributes[1])?,
            color: unpack_attribute(self.attributes[2])?,
            tex_coords,
        })
    }
}

/// Whole-buffer update of a vertex or index buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct BufferUpdateWire {
    pub buffer: Handle,
    pub byte_len: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct IndexBufferWire {
    pub handle: Handle,
    pub size: u32,
    pub count: u32,
    pub usage: u32,
}

// ── textures ──────────────────────────────────────────────────────────────────

/// Shared by 2D textures and cubemaps; for cubemaps `byte_len` is per face.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct TextureWire {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    pub byte_len: u32,
    pub format: u32,
    pub mip_count: i32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct TextureUpdateWire {
    pub texture: Handle,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub byte_len: u32,
    pub mip: i32,
}

impl TextureUpdateWire {
    pub fn region(&self) -> TextureRegion {
        TextureRegion::new(self.x, self.y, self.width, self.height)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct TextureWrapWire {
    pub texture: Handle,
    pub s: u32,
    pub t: u32,
}

impl TextureWrapWire {
    pub fn decode(&self) -> FieldResult<(Wrap, Wrap)> {
        Ok((
            field("wrap_s", self.s, Wrap::from_word)?,
            field("wrap_t", self.t, Wrap::from_word)?,
        ))
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct TextureFilterWire {
    pub texture: Handle,
    pub minification: u32,
    pub magnification: u32,
    pub mipmap: u32,
    pub anisotropy: u32,
}

impl TextureFilterWire {
    pub fn encode(texture: Handle, filter: TextureFilter) -> Self {
        Self {
            texture,
            minification: filter.minification.to_word(),
            magnification: filter.magnification.to_word(),
            mipmap: filter.mipmap.to_word(),
            anisotropy: filter.anisotropy,
        }
    }

    pub fn decode(&self) -> FieldResult<TextureFilter> {
        Ok(TextureFilter {
            minification: field("minification", self.minification, Filter::from_word)?,
            magnification: field("magnification", self.magnification, Filter::from_word)?,
            mipmap: field("mipmap", self.mipmap, Filter::from_word)?,
            anisotropy: self.anisotropy,
        })
    }
}

// ── render targets ────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct TargetWire {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub count: u32,
    pub textures: [Handle; MAX_TARGET_ATTACHMENTS],
    /// Cubemap face per attachment, `-1` for 2D textures.
    pub faces: [i32; MAX_TARGET_ATTACHMENTS],
    pub depth: Handle,
}

impl TargetWire {
    /// Attachments beyond [`MAX_TARGET_ATTACHMENTS`] are dropped.
    pub fn encode(handle: Handle, desc: &TargetDesc) -> Self {
        let mut textures = [Handle::NONE; MAX_TARGET_ATTACHMENTS];
        let mut faces = [-1; MAX_TARGET_ATTACHMENTS];
        let attached = &desc.attachments[..desc.attachments.len().min(MAX_TARGET_ATTACHMENTS)];
        for (i, a) in attached.iter().enumerate() {
            textures[i] = a.texture;
            faces[i] = a.cube_face.map_or(-1, i32::from);
        }
        Self {
            handle,
            width: desc.width,
            height: desc.height,
            samples: desc.samples,
            count: attached.len() as u32,
            textures,
            faces,
            depth: desc.depth,
        }
    }

    pub fn decode(&self) -> FieldResult<TargetDesc> {
        let count = self.count as usize;
        if count > MAX_TARGET_ATTACHMENTS {
            return Err(FieldError { field: "attachment_count", value: self.count });
        }
        let mut attachments = Vec::with_capacity(count);
        for i in 0..count {
            let cube_face = match self.faces[i] {
                -1 => None,
                face @ 0..=255 => Some(face as u8),
                face => return Err(FieldError { field: "cube_face", value: face as u32 }),
            };
            attachments.push(TargetAttachment { texture: self.textures[i], cube_face });
        }
        Ok(TargetDesc {
            width: self.width,
            height: self.height,
            samples: self.samples,
            attachments,
            depth: self.depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_are_whole_words() {
        fn words<T: Pod>() -> usize {
            assert_eq!(size_of::<T>() % 4, 0);
            size_of::<T>() / 4
        }
        assert_eq!(words::<ViewportWire>(), 16);
        assert_eq!(words::<ClearWire>(), 17);
        assert_eq!(words::<CameraWire>(), 32);
        assert_eq!(words::<VertexLayoutWire>(), 17);
        assert_eq!(words::<TargetWire>(), 38);
        words::<DrawWire>();
        words::<TextureUpdateWire>();
    }

    #[test]
    fn draw_state_options_survive_encoding() {
        let mut state = DrawState::default();
        state.blend = Some(Blend::alpha());
        state.cull = Some(CullOrder::Cw);
        state.depth_test = None;
        state.viewport.scissor = Some(Rect::new(1, 2, 3, 4));
        state.textures[3] = Handle::new(9);

        let decoded = DrawWire::encode(&state).decode().unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn invalid_enum_words_are_reported_by_field() {
        let mut wire = DrawWire::encode(&DrawState::default());
        wire.primitive = 77;
        assert_eq!(wire.decode(), Err(FieldError { field: "primitive", value: 77 }));

        // disabled options are not validated
        let mut wire = DrawWire::encode(&DrawState::default());
        wire.cull_order = 12;
        assert!(wire.decode().is_ok());
    }

    #[test]
    fn layout_packs_every_slot() {
        let mut layout = VertexLayout::default();
        layout.normal = VertexAttribute::float(12, 3);
        layout.color = VertexAttribute::new(24, 4, AttributeType::Uint8);
        layout.tex_coords[12] = VertexAttribute::new(28, 2, AttributeType::Float16);

        let wire = VertexLayoutWire::encode(Handle::new(1), &layout);
        assert_eq!(wire.attributes[2], 24 | 4 << 8 | 2 << 16);
        assert_eq!(wire.decode().unwrap(), layout);
    }

    #[test]
    fn target_attachments_are_capped_and_faces_kept() {
        let desc = TargetDesc {
            width: 64,
            height: 32,
            samples: 4,
            attachments: (0..20)
                .map(|i| match i {
                    1 => TargetAttachment::cube_face(Handle::new(i), 5),
                    _ => TargetAttachment::texture(Handle::new(i)),
                })
                .collect(),
            depth: Handle::new(99),
        };

        let decoded = TargetWire::encode(Handle::new(0), &desc).decode().unwrap();
        assert_eq!(decoded.attachments.len(), MAX_TARGET_ATTACHMENTS);
        assert_eq!(decoded.attachments[1].cube_face, Some(5));
        assert_eq!(decoded.attachments[0].cube_face, None);
        assert_eq!(decoded.depth, Handle::new(99));
    }

    #[test]
    fn any_encodable_face_decodes() {
        let desc = TargetDesc {
            attachments: vec![
                TargetAttachment::cube_face(Handle::NONE, 6),
                TargetAttachment::cube_face(Handle::new(1), u8::MAX),
            ],
            ..TargetDesc::default()
        };
        let decoded = TargetWire::encode(Handle::new(0), &desc).decode().unwrap();
        assert_eq!(decoded.attachments, desc.attachments);

        let mut wire = TargetWire::encode(Handle::new(0), &desc);
        wire.faces[0] = 256;
        assert!(wire.decode().is_err());
    }
}
