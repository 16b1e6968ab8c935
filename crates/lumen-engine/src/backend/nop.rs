use glam::Mat4;

use super::{
    ClearFlags, DrawState, IndexSize, Limits, RenderBackend, ShaderUniform, TargetDesc,
    TextureFilter, TextureRegion, UsageHint, VertexLayout, ViewportState, Wrap,
};
use crate::handle::Handle;
use crate::texture::ColorFormat;

/// Backend without a device.
///
/// Every creation fails and every other operation does nothing. Useful for headless runs and
/// for exercising the "resource never realized" paths of the command-buffer layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopBackend;

impl NopBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for NopBackend {
    fn create_shader(&mut self, _vertex: &str, _fragment: &str) -> Option<Handle> {
        None
    }

    fn uniforms(&mut self, _shader: Handle) -> Vec<ShaderUniform> {
        Vec::new()
    }

    fn remove_shader(&mut self, _shader: Handle) {}

    fn create_uniform_buffer(&mut self, _shader: Handle) -> Option<Handle> {
        None
    }

    fn set_uniform(&mut self, _uniform_buffer: Handle, _index: u32, _values: &[f32]) {}

    fn remove_uniform_buffer(&mut self, _uniform_buffer: Handle) {}

    fn create_vertex_buffer(&mut self, _data: &[u8], _stride: u32, _count: u32, _usage: UsageHint) -> Option<Handle> {
        None
    }

    fn set_vertex_layout(&mut self, _buffer: Handle, _layout: &VertexLayout) {}

    fn update_vertex_buffer(&mut self, _buffer: Handle, _data: &[u8]) {}

    fn remove_vertex_buffer(&mut self, _buffer: Handle) {}

    fn create_index_buffer(&mut self, _data: &[u8], _size: IndexSize, _count: u32, _usage: UsageHint) -> Option<Handle> {
        None
    }

    fn update_index_buffer(&mut self, _buffer: Handle, _data: &[u8]) {}

    fn remove_index_buffer(&mut self, _buffer: Handle) {}

    fn create_texture(
        &mut self,
        _data: Option<&[u8]>,
        _width: u32,
        _height: u32,
        _format: ColorFormat,
        _mip_count: i32,
    ) -> Option<Handle> {
        None
    }

    fn create_cubemap(&mut self, _faces: Option<[&[u8]; 6]>, _width: u32, _format: ColorFormat, _mip_count: i32) -> Option<Handle> {
        None
    }

    fn update_texture(&mut self, _texture: Handle, _data: &[u8], _region: TextureRegion, _mip: i32) {}

    fn set_texture_wrap(&mut self, _texture: Handle, _s: Wrap, _t: Wrap) {}

    fn set_texture_filter(&mut self, _texture: Handle, _filter: TextureFilter) {}

    fn remove_texture(&mut self, _texture: Handle) {}

    fn is_texture_format_supported(&self, _format: ColorFormat) -> bool {
        false
    }

    fn create_target(&mut self, _desc: &TargetDesc) -> Option<Handle> {
        None
    }

    fn resolve_target(&mut self, _target: Handle) {}

    fn remove_target(&mut self, _target: Handle) {}

    fn limits(&self) -> Limits {
        Limits::default()
    }

    fn set_camera(&mut self, _modelview: &Mat4, _projection: &Mat4) {}

    fn clear(&mut self, _viewport: &ViewportState, _flags: ClearFlags) {}

    fn draw(&mut self, _state: &DrawState) {}

    fn apply_state(&mut self, _state: &DrawState) {}
}
