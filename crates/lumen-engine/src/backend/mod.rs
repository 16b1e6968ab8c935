//! Backend capability interface.
//!
//! A concrete GPU API (OpenGL, Direct3D, Metal, wgpu, ...) plugs into the engine by implementing
//! [`RenderBackend`]. The command-buffer layer depends on nothing else: it replays recorded
//! streams through exactly these operations.
//!
//! Conventions:
//! - creations return `Some(handle)` with a backend-defined non-negative handle, `None` on failure
//! - a backend logs its own failures (compile errors, out of memory); callers only see `None`
//! - handles passed in are handles this backend returned, or [`Handle::NONE`] for "unbound"

mod nop;
mod recording;
mod resource;
mod state;

pub use nop::NopBackend;
pub use recording::{BackendCall, CallLog, RecordingBackend};
pub use resource::{
    AttributeType, Filter, IndexSize, Limits, ShaderUniform, TargetAttachment, TargetDesc,
    TextureFilter, TextureRegion, UniformType, UsageHint, VertexAttribute, VertexLayout, Wrap,
    MAX_TARGET_ATTACHMENTS, MAX_TEX_COORDS,
};
pub use state::{
    Blend, BlendFactor, ClearFlags, CullOrder, DepthFunc, DrawState, Primitive, ViewportState,
    MAX_TEXTURE_LAYERS,
};

use glam::Mat4;

use crate::handle::Handle;
use crate::texture::ColorFormat;

/// Operation surface of a rendering API.
///
/// Selected once at startup and usually held as `Box<dyn RenderBackend>`.
pub trait RenderBackend {
    // ── shaders & uniforms ────────────────────────────────────────────────

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Option<Handle>;

    /// Uniforms declared by `shader`, excluding engine-provided transform matrices.
    fn uniforms(&mut self, shader: Handle) -> Vec<ShaderUniform>;

    fn remove_shader(&mut self, shader: Handle);

    fn create_uniform_buffer(&mut self, shader: Handle) -> Option<Handle>;

    /// Writes `values` into uniform `index` of `uniform_buffer`.
    fn set_uniform(&mut self, uniform_buffer: Handle, index: u32, values: &[f32]);

    fn remove_uniform_buffer(&mut self, uniform_buffer: Handle);

    // ── geometry ──────────────────────────────────────────────────────────

    /// `data` holds `stride * count` bytes.
    fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        stride: u32,
        count: u32,
        usage: UsageHint,
    ) -> Option<Handle>;

    fn set_vertex_layout(&mut self, buffer: Handle, layout: &VertexLayout);

    /// Replaces the whole contents; `data` is as long as the buffer.
    fn update_vertex_buffer(&mut self, buffer: Handle, data: &[u8]);

    /// Copies buffer contents back into `out`. Optional capability.
    fn read_vertex_data(&mut self, buffer: Handle, out: &mut [u8]) -> bool {
        let _ = (buffer, out);
        false
    }

    fn remove_vertex_buffer(&mut self, buffer: Handle);

    /// `data` holds `size.bytes() * count` bytes.
    fn create_index_buffer(
        &mut self,
        data: &[u8],
        size: IndexSize,
        count: u32,
        usage: UsageHint,
    ) -> Option<Handle>;

    fn update_index_buffer(&mut self, buffer: Handle, data: &[u8]);

    /// Copies buffer contents back into `out`. Optional capability.
    fn read_index_data(&mut self, buffer: Handle, out: &mut [u8]) -> bool {
        let _ = (buffer, out);
        false
    }

    fn remove_index_buffer(&mut self, buffer: Handle);

    // ── textures ──────────────────────────────────────────────────────────

    /// `data` is `None` for an uninitialized texture (e.g. a render target attachment).
    ///
    /// See [`texture_byte_size`](crate::texture::texture_byte_size) for the `mip_count`
    /// convention and the expected data length.
    fn create_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: ColorFormat,
        mip_count: i32,
    ) -> Option<Handle>;

    /// Faces in +X, -X, +Y, -Y, +Z, -Z order; each face is `width * width` texels.
    fn create_cubemap(
        &mut self,
        faces: Option<[&[u8]; 6]>,
        width: u32,
        format: ColorFormat,
        mip_count: i32,
    ) -> Option<Handle>;

    /// `mip < 0` updates every level.
    fn update_texture(&mut self, texture: Handle, data: &[u8], region: TextureRegion, mip: i32);

    fn set_texture_wrap(&mut self, texture: Handle, s: Wrap, t: Wrap);

    fn set_texture_filter(&mut self, texture: Handle, filter: TextureFilter);

    /// Copies a region of texels back into `out`. Optional capability.
    fn read_texture_data(&mut self, texture: Handle, region: TextureRegion, out: &mut [u8]) -> bool {
        let _ = (texture, region, out);
        false
    }

    fn remove_texture(&mut self, texture: Handle);

    fn is_texture_format_supported(&self, format: ColorFormat) -> bool;

    // ── render targets ────────────────────────────────────────────────────

    fn create_target(&mut self, desc: &TargetDesc) -> Option<Handle>;

    /// Resolves a multisampled target into its attachments.
    fn resolve_target(&mut self, target: Handle);

    fn remove_target(&mut self, target: Handle);

    fn limits(&self) -> Limits;

    // ── frame operations ──────────────────────────────────────────────────

    fn set_camera(&mut self, modelview: &Mat4, projection: &Mat4);

    fn clear(&mut self, viewport: &ViewportState, flags: ClearFlags);

    /// Draws with the given state; indexed when `state.index_buffer` is set, instanced when
    /// `state.instance_count > 1`.
    fn draw(&mut self, state: &DrawState);

    /// Applies state without drawing.
    fn apply_state(&mut self, state: &DrawState);

    /// Forgets any state the backend caches between calls.
    fn invalidate_cached_state(&mut self) {}
}
