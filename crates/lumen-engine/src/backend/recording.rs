use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Mat4;

use super::{
    ClearFlags, DrawState, IndexSize, Limits, RenderBackend, ShaderUniform, TargetDesc,
    TextureFilter, TextureRegion, UsageHint, VertexLayout, ViewportState, Wrap,
};
use crate::handle::Handle;
use crate::shader;
use crate::texture::ColorFormat;

/// One operation received by a [`RecordingBackend`], with owned copies of its data.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateShader { handle: Option<Handle>, vertex: String, fragment: String },
    RemoveShader(Handle),
    CreateUniformBuffer { handle: Option<Handle>, shader: Handle },
    SetUniform { buffer: Handle, index: u32, values: Vec<f32> },
    RemoveUniformBuffer(Handle),

    CreateVertexBuffer { handle: Option<Handle>, data: Vec<u8>, stride: u32, count: u32, usage: UsageHint },
    SetVertexLayout { buffer: Handle, layout: VertexLayout },
    UpdateVertexBuffer { buffer: Handle, data: Vec<u8> },
    RemoveVertexBuffer(Handle),
    CreateIndexBuffer { handle: Option<Handle>, data: Vec<u8>, size: IndexSize, count: u32, usage: UsageHint },
    UpdateIndexBuffer { buffer: Handle, data: Vec<u8> },
    RemoveIndexBuffer(Handle),

    CreateTexture {
        handle: Option<Handle>,
        data: Option<Vec<u8>>,
        width: u32,
        height: u32,
        format: ColorFormat,
        mip_count: i32,
    },
    CreateCubemap {
        handle: Option<Handle>,
        faces: Option<Vec<Vec<u8>>>,
        width: u32,
        format: ColorFormat,
        mip_count: i32,
    },
    UpdateTexture { texture: Handle, data: Vec<u8>, region: TextureRegion, mip: i32 },
    SetTextureWrap { texture: Handle, s: Wrap, t: Wrap },
    SetTextureFilter { texture: Handle, filter: TextureFilter },
    RemoveTexture(Handle),

    CreateTarget { handle: Option<Handle>, desc: TargetDesc },
    ResolveTarget(Handle),
    RemoveTarget(Handle),

    SetCamera { modelview: Mat4, projection: Mat4 },
    Clear { viewport: ViewportState, flags: ClearFlags },
    Draw(DrawState),
    ApplyState(DrawState),
    InvalidateCachedState,
}

impl BackendCall {
    /// Whether this call is a resource creation.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            BackendCall::CreateShader { .. }
                | BackendCall::CreateUniformBuffer { .. }
                | BackendCall::CreateVertexBuffer { .. }
                | BackendCall::CreateIndexBuffer { .. }
                | BackendCall::CreateTexture { .. }
                | BackendCall::CreateCubemap { .. }
                | BackendCall::CreateTarget { .. }
        )
    }
}

/// Shared, cloneable view of the calls a [`RecordingBackend`] received.
///
/// The backend itself usually disappears into a `Box<dyn RenderBackend>`; keep a `CallLog`
/// clone to inspect what was replayed.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl CallLog {
    fn lock(&self) -> MutexGuard<'_, Vec<BackendCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: BackendCall) {
        log::trace!("backend call: {call:?}");
        self.lock().push(call);
    }

    /// Snapshot of every call so far, in arrival order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().clone()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<BackendCall> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Backend that keeps no GPU state and records every call.
///
/// Real handles are issued sequentially from `first_handle` (default 100, so they are easy to
/// tell apart from virtual handles). Buffer contents are retained, so read-back works.
#[derive(Debug)]
pub struct RecordingBackend {
    log: CallLog,
    next_handle: i32,
    fail_creations: bool,
    limits: Limits,
    uniforms: HashMap<Handle, Vec<ShaderUniform>>,
    buffers: HashMap<Handle, Vec<u8>>,
}

impl RecordingBackend {
    /// Creates a backend and the log that observes it.
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        let backend = Self {
            log: log.clone(),
            next_handle: 100,
            fail_creations: false,
            limits: Limits {
                max_texture_dimension: 4096,
                max_target_attachments: 8,
                max_target_msaa: 4,
            },
            uniforms: HashMap::new(),
            buffers: HashMap::new(),
        };
        (backend, log)
    }

    /// First real handle to hand out.
    pub fn with_first_handle(mut self, first: i32) -> Self {
        self.next_handle = first.max(0);
        self
    }

    /// Makes every subsequent creation fail (still recorded, with `handle: None`).
    pub fn with_failing_creations(mut self, fail: bool) -> Self {
        self.fail_creations = fail;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn set_failing_creations(&mut self, fail: bool) {
        self.fail_creations = fail;
    }

    pub fn call_log(&self) -> &CallLog {
        &self.log
    }

    fn next(&mut self) -> Option<Handle> {
        if self.fail_creations {
            return None;
        }
        let handle = Handle::from_raw(self.next_handle);
        self.next_handle += 1;
        Some(handle)
    }

    fn read_buffer(&mut self, buffer: Handle, out: &mut [u8]) -> bool {
        let Some(data) = self.buffers.get(&buffer) else { return false };
        let n = data.len().min(out.len());
        out[..n].copy_from_slice(&data[..n]);
        true
    }
}

impl RenderBackend for RecordingBackend {
    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Option<Handle> {
        let handle = self.next();
        if let Some(h) = handle {
            self.uniforms.insert(h, shader::reflect_uniforms(&[vertex, fragment]));
        }
        self.log.push(BackendCall::CreateShader {
            handle,
            vertex: vertex.to_owned(),
            fragment: fragment.to_owned(),
        });
        handle
    }

    fn uniforms(&mut self, shader: Handle) -> Vec<ShaderUniform> {
        self.uniforms.get(&shader).cloned().unwrap_or_default()
    }

    fn remove_shader(&mut self, shader: Handle) {
        self.uniforms.remove(&shader);
        self.log.push(BackendCall::RemoveShader(shader));
    }

    fn create_uniform_buffer(&mut self, shader: Handle) -> Option<Handle> {
        let handle = self.next();
        self.log.push(BackendCall::CreateUniformBuffer { handle, shader });
        handle
    }

    fn set_uniform(&mut self, uniform_buffer: Handle, index: u32, values: &[f32]) {
        self.log.push(BackendCall::SetUniform {
            buffer: uniform_buffer,
            index,
            values: values.to_vec(),
        });
    }

    fn remove_uniform_buffer(&mut self, uniform_buffer: Handle) {
        self.log.push(BackendCall::RemoveUniformBuffer(uniform_buffer));
    }

    fn create_vertex_buffer(&mut self, data: &[u8], stride: u32, count: u32, usage: UsageHint) -> Option<Handle> {
        let handle = self.next();
        if let Some(h) = handle {
            self.buffers.insert(h, data.to_vec());
        }
        self.log.push(BackendCall::CreateVertexBuffer {
            handle,
            data: data.to_vec(),
            stride,
            count,
            usage,
        });
        handle
    }

    fn set_vertex_layout(&mut self, buffer: Handle, layout: &VertexLayout) {
        self.log.push(BackendCall::SetVertexLayout { buffer, layout: *layout });
    }

    fn update_vertex_buffer(&mut self, buffer: Handle, data: &[u8]) {
        if let Some(stored) = self.buffers.get_mut(&buffer) {
            stored.clear();
            stored.extend_from_slice(data);
        }
        self.log.push(BackendCall::UpdateVertexBuffer { buffer, data: data.to_vec() });
    }

    fn read_vertex_data(&mut self, buffer: Handle, out: &mut [u8]) -> bool {
        self.read_buffer(buffer, out)
    }

    fn remove_vertex_buffer(&mut self, buffer: Handle) {
        self.buffers.remove(&buffer);
        self.log.push(BackendCall::RemoveVertexBuffer(buffer));
    }

    fn create_index_buffer(&mut self, data: &[u8], size: IndexSize, count: u32, usage: UsageHint) -> Option<Handle> {
        let handle = self.next();
        if let Some(h) = handle {
            self.buffers.insert(h, data.to_vec());
        }
        self.log.push(BackendCall::CreateIndexBuffer {
            handle,
            data: data.to_vec(),
            size,
            count,
            usage,
        });
        handle
    }

    fn update_index_buffer(&mut self, buffer: Handle, data: &[u8]) {
        if let Some(stored) = self.buffers.get_mut(&buffer) {
            stored.clear();
            stored.extend_from_slice(data);
        }
        self.log.push(BackendCall::UpdateIndexBuffer { buffer, data: data.to_vec() });
    }

    fn read_index_data(&mut self, buffer: Handle, out: &mut [u8]) -> bool {
        self.read_buffer(buffer, out)
    }

    fn remove_index_buffer(&mut self, buffer: Handle) {
        self.buffers.remove(&buffer);
        self.log.push(BackendCall::RemoveIndexBuffer(buffer));
    }

    fn create_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: ColorFormat,
        mip_count: i32,
    ) -> Option<Handle> {
        let handle = self.next();
        self.log.push(BackendCall::CreateTexture {
            handle,
            data: data.map(<[u8]>::to_vec),
            width,
            height,
            format,
            mip_count,
        });
        handle
    }

    fn create_cubemap(&mut self, faces: Option<[&[u8]; 6]>, width: u32, format: ColorFormat, mip_count: i32) -> Option<Handle> {
        let handle = self.next();
        self.log.push(BackendCall::CreateCubemap {
            handle,
            faces: faces.map(|f| f.iter().map(|face| face.to_vec()).collect()),
            width,
            format,
            mip_count,
        });
        handle
    }

    fn update_texture(&mut self, texture: Handle, data: &[u8], region: TextureRegion, mip: i32) {
        self.log.push(BackendCall::UpdateTexture {
            texture,
            data: data.to_vec(),
            region,
            mip,
        });
    }

    fn set_texture_wrap(&mut self, texture: Handle, s: Wrap, t: Wrap) {
        self.log.push(BackendCall::SetTextureWrap { texture, s, t });
    }

    fn set_texture_filter(&mut self, texture: Handle, filter: TextureFilter) {
        self.log.push(BackendCall::SetTextureFilter { texture, filter });
    }

    fn remove_texture(&mut self, texture: Handle) {
        self.log.push(BackendCall::RemoveTexture(texture));
    }

    fn is_texture_format_supported(&self, format: ColorFormat) -> bool {
        !format.is_compressed()
    }

    fn create_target(&mut self, desc: &TargetDesc) -> Option<Handle> {
        let handle = self.next();
        self.log.push(BackendCall::CreateTarget { handle, desc: desc.clone() });
        handle
    }

    fn resolve_target(&mut self, target: Handle) {
        self.log.push(BackendCall::ResolveTarget(target));
    }

    fn remove_target(&mut self, target: Handle) {
        self.log.push(BackendCall::RemoveTarget(target));
    }

    fn limits(&self) -> Limits {
        self.limits
    }

    fn set_camera(&mut self, modelview: &Mat4, projection: &Mat4) {
        self.log.push(BackendCall::SetCamera {
            modelview: *modelview,
            projection: *projection,
        });
    }

    fn clear(&mut self, viewport: &ViewportState, flags: ClearFlags) {
        self.log.push(BackendCall::Clear { viewport: *viewport, flags });
    }

    fn draw(&mut self, state: &DrawState) {
        self.log.push(BackendCall::Draw(*state));
    }

    fn apply_state(&mut self, state: &DrawState) {
        self.log.push(BackendCall::ApplyState(*state));
    }

    fn invalidate_cached_state(&mut self) {
        self.log.push(BackendCall::InvalidateCachedState);
    }
}
