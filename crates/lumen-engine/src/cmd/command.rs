use glam::Mat4;

use super::Opcode;
use crate::backend::{
    ClearFlags, DrawState, IndexSize, TargetDesc, TextureFilter, TextureRegion, UsageHint,
    VertexLayout, ViewportState, Wrap,
};
use crate::handle::Handle;
use crate::texture::ColorFormat;

/// One recorded backend operation.
///
/// The same type is pushed into a [`CommandStream`](super::CommandStream) and yielded back by a
/// [`CommandReader`](super::CommandReader); byte payloads borrow from the caller when encoding and
/// from the stream when decoding. Handles are virtual until the replayer remaps them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Clear {
        viewport: ViewportState,
        flags: ClearFlags,
    },
    Camera {
        modelview: Mat4,
        projection: Mat4,
    },
    ApplyState(DrawState),
    Draw(DrawState),
    SetUniform {
        buffer: Handle,
        index: u32,
        values: &'a [f32],
    },
    ResolveTarget(Handle),

    CreateShader {
        handle: Handle,
        vertex: &'a str,
        fragment: &'a str,
    },
    RemoveShader(Handle),
    CreateUniformBuffer {
        handle: Handle,
        shader: Handle,
    },
    RemoveUniformBuffer(Handle),

    /// `data` is stored as exactly `stride * count` bytes.
    CreateVertexBuffer {
        handle: Handle,
        stride: u32,
        count: u32,
        usage: UsageHint,
        data: &'a [u8],
    },
    SetVertexLayout {
        buffer: Handle,
        layout: VertexLayout,
    },
    UpdateVertexBuffer {
        buffer: Handle,
        data: &'a [u8],
    },
    RemoveVertexBuffer(Handle),

    /// `data` is stored as exactly `size.bytes() * count` bytes.
    CreateIndexBuffer {
        handle: Handle,
        size: IndexSize,
        count: u32,
        usage: UsageHint,
        data: &'a [u8],
    },
    UpdateIndexBuffer {
        buffer: Handle,
        data: &'a [u8],
    },
    RemoveIndexBuffer(Handle),

    /// Empty `data` decodes as `None`.
    CreateTexture {
        handle: Handle,
        width: u32,
        height: u32,
        format: ColorFormat,
        mip_count: i32,
        data: Option<&'a [u8]>,
    },
    /// Every face is stored with the length of the first one.
    CreateCubemap {
        handle: Handle,
        width: u32,
        format: ColorFormat,
        mip_count: i32,
        faces: Option<[&'a [u8]; 6]>,
    },
    UpdateTexture {
        texture: Handle,
        region: TextureRegion,
        mip: i32,
        data: &'a [u8],
    },
    SetTextureWrap {
        texture: Handle,
        s: Wrap,
        t: Wrap,
    },
    SetTextureFilter {
        texture: Handle,
        filter: TextureFilter,
    },
    RemoveTexture(Handle),

    CreateTarget {
        handle: Handle,
        desc: TargetDesc,
    },
    RemoveTarget(Handle),

    InvalidateState,
}

impl Command<'_> {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Clear { .. } => Opcode::Clear,
            Command::Camera { .. } => Opcode::Camera,
            Command::ApplyState(_) => Opcode::ApplyState,
            Command::Draw(_) => Opcode::Draw,
            Command::SetUniform { .. } => Opcode::SetUniform,
            Command::ResolveTarget(_) => Opcode::ResolveTarget,
            Command::CreateShader { .. } => Opcode::CreateShader,
            Command::RemoveShader(_) => Opcode::RemoveShader,
            Command::CreateUniformBuffer { .. } => Opcode::CreateUniformBuffer,
            Command::RemoveUniformBuffer(_) => Opcode::RemoveUniformBuffer,
            Command::CreateVertexBuffer { .. } => Opcode::CreateVertexBuffer,
            Command::SetVertexLayout { .. } => Opcode::SetVertexLayout,
            Command::UpdateVertexBuffer { .. } => Opcode::UpdateVertexBuffer,
            Command::RemoveVertexBuffer(_) => Opcode::RemoveVertexBuffer,
            Command::CreateIndexBuffer { .. } => Opcode::CreateIndexBuffer,
            Command::UpdateIndexBuffer { .. } => Opcode::UpdateIndexBuffer,
            Command::RemoveIndexBuffer(_) => Opcode::RemoveIndexBuffer,
            Command::CreateTexture { .. } => Opcode::CreateTexture,
            Command::CreateCubemap { .. } => Opcode::CreateCubemap,
            Command::UpdateTexture { .. } => Opcode::UpdateTexture,
            Command::SetTextureWrap { .. } => Opcode::SetTextureWrap,
            Command::SetTextureFilter { .. } => Opcode::SetTextureFilter,
            Command::RemoveTexture(_) => Opcode::RemoveTexture,
            Command::CreateTarget { .. } => Opcode::CreateTarget,
            Command::RemoveTarget(_) => Opcode::RemoveTarget,
            Command::InvalidateState => Opcode::InvalidateState,
        }
    }
}
