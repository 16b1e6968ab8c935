//! Recording side of [`BufferedRenderer`]: every backend operation becomes a command.

use std::borrow::Cow;

use glam::Mat4;

use super::BufferedRenderer;
use crate::backend::{
    ClearFlags, DrawState, IndexSize, Limits, RenderBackend, ShaderUniform, TargetDesc,
    TextureFilter, TextureRegion, UsageHint, VertexLayout, ViewportState, Wrap,
    MAX_TARGET_ATTACHMENTS,
};
use crate::cmd::Command;
use crate::handle::Handle;
use crate::shader::reflect_uniforms;
use crate::texture::{texture_byte_size, ColorFormat};

/// `data` truncated or zero-extended to `len` bytes.
fn fitted<'a>(what: &str, data: &'a [u8], len: usize) -> Cow<'a, [u8]> {
    if data.len() == len {
        return Cow::Borrowed(data);
    }
    log::warn!("{what}: got {} bytes, expected {len}; fitting", data.len());
    let mut owned = data[..data.len().min(len)].to_vec();
    owned.resize(len, 0);
    Cow::Owned(owned)
}

impl BufferedRenderer {
    fn allocate(&mut self) -> Handle {
        self.current.table.allocate()
    }

    fn record_removal(&mut self, handle: Handle, command: Command<'_>) {
        if handle.is_none() {
            return;
        }
        self.books.forget(handle);
        self.record(&command);
    }

    fn read_back_unsupported(&self, what: &str) -> bool {
        log::warn!("{what}: read-back is not available through the buffered renderer");
        false
    }
}

impl RenderBackend for BufferedRenderer {
    // ── shaders & uniforms ────────────────────────────────────────────────

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Option<Handle> {
        let handle = self.allocate();
        self.books.uniforms.insert(handle, reflect_uniforms(&[vertex, fragment]));
        self.record(&Command::CreateShader { handle, vertex, fragment });
        Some(handle)
    }

    fn uniforms(&mut self, shader: Handle) -> Vec<ShaderUniform> {
        self.books.uniforms.get(&shader).cloned().unwrap_or_default()
    }

    fn remove_shader(&mut self, shader: Handle) {
        self.record_removal(shader, Command::RemoveShader(shader));
    }

    fn create_uniform_buffer(&mut self, shader: Handle) -> Option<Handle> {
        let handle = self.allocate();
        self.record(&Command::CreateUniformBuffer { handle, shader });
        Some(handle)
    }

    fn set_uniform(&mut self, uniform_buffer: Handle, index: u32, values: &[f32]) {
        self.record(&Command::SetUniform {
            buffer: uniform_buffer,
            index,
            values,
        });
    }

    fn remove_uniform_buffer(&mut self, uniform_buffer: Handle) {
        self.record_removal(uniform_buffer, Command::RemoveUniformBuffer(uniform_buffer));
    }

    // ── geometry ──────────────────────────────────────────────────────────

    fn create_vertex_buffer(&mut self, data: &[u8], stride: u32, count: u32, usage: UsageHint) -> Option<Handle> {
        let handle = self.allocate();
        let len = stride as usize * count as usize;
        let data = fitted("create_vertex_buffer", data, len);
        self.books.buffer_sizes.insert(handle, len);
        self.record(&Command::CreateVertexBuffer {
            handle,
            stride,
            count,
            usage,
            data: &data,
        });
        Some(handle)
    }

    fn set_vertex_layout(&mut self, buffer: Handle, layout: &VertexLayout) {
        self.record(&Command::SetVertexLayout { buffer, layout: *layout });
    }

    fn update_vertex_buffer(&mut self, buffer: Handle, data: &[u8]) {
        let data = match self.books.buffer_sizes.get(&buffer) {
            Some(&len) => fitted("update_vertex_buffer", data, len),
            None => Cow::Borrowed(data),
        };
        self.record(&Command::UpdateVertexBuffer { buffer, data: &data });
    }

    fn read_vertex_data(&mut self, _buffer: Handle, _out: &mut [u8]) -> bool {
        self.read_back_unsupported("read_vertex_data")
    }

    fn remove_vertex_buffer(&mut self, buffer: Handle) {
        self.record_removal(buffer, Command::RemoveVertexBuffer(buffer));
    }

    fn create_index_buffer(&mut self, data: &[u8], size: IndexSize, count: u32, usage: UsageHint) -> Option<Handle> {
        let handle = self.allocate();
        let len = size.bytes() as usize * count as usize;
        let data = fitted("create_index_buffer", data, len);
        self.books.buffer_sizes.insert(handle, len);
        self.record(&Command::CreateIndexBuffer {
            handle,
            size,
            count,
            usage,
            data: &data,
        });
        Some(handle)
    }

    fn update_index_buffer(&mut self, buffer: Handle, data: &[u8]) {
        let data = match self.books.buffer_sizes.get(&buffer) {
            Some(&len) => fitted("update_index_buffer", data, len),
            None => Cow::Borrowed(data),
        };
        self.record(&Command::UpdateIndexBuffer { buffer, data: &data });
    }

    fn read_index_data(&mut self, _buffer: Handle, _out: &mut [u8]) -> bool {
        self.read_back_unsupported("read_index_data")
    }

    fn remove_index_buffer(&mut self, buffer: Handle) {
        self.record_removal(buffer, Command::RemoveIndexBuffer(buffer));
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: ColorFormat,
        mip_count: i32,
    ) -> Option<Handle> {
        let handle = self.allocate();
        let len = texture_byte_size(width, height, format, mip_count);
        let data = data.filter(|_| len > 0).map(|d| fitted("create_texture", d, len));
        self.books.texture_formats.insert(handle, format);
        self.record(&Command::CreateTexture {
            handle,
            width,
            height,
            format,
            mip_count,
            data: data.as_deref(),
        });
        Some(handle)
    }

    fn create_cubemap(&mut self, faces: Option<[&[u8]; 6]>, width: u32, format: ColorFormat, mip_count: i32) -> Option<Handle> {
        let handle = self.allocate();
        let len = texture_byte_size(width, width, format, mip_count);
        let faces = faces
            .filter(|_| len > 0)
            .map(|faces| faces.map(|face| fitted("create_cubemap", face, len)));
        self.books.texture_formats.insert(handle, format);
        self.record(&Command::CreateCubemap {
            handle,
            width,
            format,
            mip_count,
            faces: faces.as_ref().map(|f| f.each_ref().map(|face| &**face)),
        });
        Some(handle)
    }

    fn update_texture(&mut self, texture: Handle, data: &[u8], region: TextureRegion, mip: i32) {
        let data = match self.books.texture_formats.get(&texture) {
            Some(format) => fitted("update_texture", data, format.level_size(region.width, region.height)),
            None => Cow::Borrowed(data),
        };
        self.record(&Command::UpdateTexture {
            texture,
            region,
            mip,
            data: &data,
        });
    }

    fn set_texture_wrap(&mut self, texture: Handle, s: Wrap, t: Wrap) {
        self.record(&Command::SetTextureWrap { texture, s, t });
    }

    fn set_texture_filter(&mut self, texture: Handle, filter: TextureFilter) {
        self.record(&Command::SetTextureFilter { texture, filter });
    }

    fn read_texture_data(&mut self, _texture: Handle, _region: TextureRegion, _out: &mut [u8]) -> bool {
        self.read_back_unsupported("read_texture_data")
    }

    fn remove_texture(&mut self, texture: Handle) {
        self.record_removal(texture, Command::RemoveTexture(texture));
    }

    fn is_texture_format_supported(&self, format: ColorFormat) -> bool {
        self.caps.formats[format.to_word() as usize]
    }

    // ── render targets ────────────────────────────────────────────────────

    fn create_target(&mut self, desc: &TargetDesc) -> Option<Handle> {
        if desc.attachments.len() > MAX_TARGET_ATTACHMENTS {
            log::warn!(
                "create_target: {} attachments, only the first {MAX_TARGET_ATTACHMENTS} are kept",
                desc.attachments.len()
            );
        }
        let handle = self.allocate();
        let kept = &desc.attachments[..desc.attachments.len().min(MAX_TARGET_ATTACHMENTS)];
        if let Some(bad) = kept.iter().find(|a| !a.is_valid()) {
            log::warn!("create_target: {bad:?} names no cubemap face, {handle:?} will not resolve");
            return Some(handle);
        }
        self.record(&Command::CreateTarget { handle, desc: desc.clone() });
        Some(handle)
    }

    fn resolve_target(&mut self, target: Handle) {
        self.record(&Command::ResolveTarget(target));
    }

    fn remove_target(&mut self, target: Handle) {
        self.record_removal(target, Command::RemoveTarget(target));
    }

    fn limits(&self) -> Limits {
        self.caps.limits
    }

    // ── frame operations ──────────────────────────────────────────────────

    fn set_camera(&mut self, modelview: &Mat4, projection: &Mat4) {
        self.record(&Command::Camera {
            modelview: *modelview,
            projection: *projection,
        });
    }

    fn clear(&mut self, viewport: &ViewportState, flags: ClearFlags) {
        self.record(&Command::Clear { viewport: *viewport, flags });
    }

    fn draw(&mut self, state: &DrawState) {
        self.record(&Command::Draw(*state));
    }

    fn apply_state(&mut self, state: &DrawState) {
        self.record(&Command::ApplyState(*state));
    }

    fn invalidate_cached_state(&mut self) {
        self.record(&Command::InvalidateState);
    }
}
