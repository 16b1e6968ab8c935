use bytemuck::Pod;

use super::payload::{
    BufferUpdateWire, CameraWire, ClearWire, DrawWire, IndexBufferWire, ShaderWire, TargetWire,
    TextureFilterWire, TextureUpdateWire, TextureWire, TextureWrapWire, UniformBufferWire,
    UniformWire, VertexBufferWire, VertexLayoutWire, ViewportWire,
};
use super::{Command, CommandReader, Opcode};
use crate::handle::Handle;

/// Words needed to hold `bytes` bytes.
#[inline]
pub(crate) const fn words_for(bytes: usize) -> usize {
    bytes.div_ceil(4)
}

/// Growable buffer of encoded commands.
///
/// Layout of one command: the opcode word, the fixed payload, then zero or more byte tails, each
/// zero-padded to a word boundary. Tail lengths are always derivable from payload fields, so the
/// stream carries no framing besides the opcode.
///
/// Pushing never fails. Clearing keeps the allocation so a stage reaches a steady-state capacity
/// after a few frames.
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    words: Vec<u32>,
    commands: usize,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(words: usize) -> Self {
        Self {
            words: Vec::with_capacity(words),
            commands: 0,
        }
    }

    /// Appends one command.
    pub fn push(&mut self, command: &Command<'_>) {
        self.op(command.opcode());

        match command {
            Command::Clear { viewport, flags } => {
                let bits = u32::from(flags.color) | u32::from(flags.depth) << 1 | u32::from(flags.stencil) << 2;
                self.payload(&ClearWire {
                    viewport: ViewportWire::encode(viewport),
                    flags: bits,
                });
            }
            Command::Camera { modelview, projection } => {
                self.payload(&CameraWire {
                    modelview: modelview.to_cols_array(),
                    projection: projection.to_cols_array(),
                });
            }
            Command::ApplyState(state) | Command::Draw(state) => {
                self.payload(&DrawWire::encode(state));
            }
            Command::SetUniform { buffer, index, values } => {
                self.payload(&UniformWire {
                    buffer: *buffer,
                    index: *index,
                    count: values.len() as u32,
                });
                self.words.extend(values.iter().map(|v| v.to_bits()));
            }
            Command::CreateShader { handle, vertex, fragment } => {
                self.payload(&ShaderWire {
                    handle: *handle,
                    vertex_len: vertex.len() as u32,
                    fragment_len: fragment.len() as u32,
                });
                self.tail(vertex.as_bytes());
                self.tail(fragment.as_bytes());
            }
            Command::CreateUniformBuffer { handle, shader } => {
                self.payload(&UniformBufferWire {
                    handle: *handle,
                    shader: *shader,
                });
            }
            Command::CreateVertexBuffer { handle, stride, count, usage, data } => {
                self.payload(&VertexBufferWire {
                    handle: *handle,
                    stride: *stride,
                    count: *count,
                    usage: usage.to_word(),
                });
                self.tail_fitted(data, *stride as usize * *count as usize);
            }
            Command::SetVertexLayout { buffer, layout } => {
                self.payload(&VertexLayoutWire::encode(*buffer, layout));
            }
            Command::UpdateVertexBuffer { buffer, data } | Command::UpdateIndexBuffer { buffer, data } => {
                self.payload(&BufferUpdateWire {
                    buffer: *buffer,
                    byte_len: data.len() as u32,
                });
                self.tail(data);
            }
            Command::CreateIndexBuffer { handle, size, count, usage, data } => {
                self.payload(&IndexBufferWire {
                    handle: *handle,
                    size: size.to_word(),
                    count: *count,
                    usage: usage.to_word(),
                });
                self.tail_fitted(data, size.bytes() as usize * *count as usize);
            }
            Command::CreateTexture { handle, width, height, format, mip_count, data } => {
                let data = data.unwrap_or_default();
                self.payload(&TextureWire {
                    handle: *handle,
                    width: *width,
                    height: *height,
                    byte_len: data.len() as u32,
                    format: format.to_word(),
                    mip_count: *mip_count,
                });
                self.tail(data);
            }
            Command::CreateCubemap { handle, width, format, mip_count, faces } => {
                let face_len = faces.map_or(0, |f| f[0].len());
                self.payload(&TextureWire {
                    handle: *handle,
                    width: *width,
                    height: *width,
                    byte_len: face_len as u32,
                    format: format.to_word(),
                    mip_count: *mip_count,
                });
                if let Some(faces) = faces
                    && face_len > 0
                {
                    for face in faces {
                        self.tail_fitted(face, face_len);
                    }
                }
            }
            Command::UpdateTexture { texture, region, mip, data } => {
                self.payload(&TextureUpdateWire {
                    texture: *texture,
                    x: region.x,
                    y: region.y,
                    width: region.width,
                    height: region.height,
                    byte_len: data.len() as u32,
                    mip: *mip,
                });
                self.tail(data);
            }
            Command::SetTextureWrap { texture, s, t } => {
                self.payload(&TextureWrapWire {
                    texture: *texture,
                    s: s.to_word(),
                    t: t.to_word(),
                });
            }
            Command::SetTextureFilter { texture, filter } => {
                self.payload(&TextureFilterWire::encode(*texture, *filter));
            }
            Command::CreateTarget { handle, desc } => {
                self.payload(&TargetWire::encode(*handle, desc));
            }
            Command::ResolveTarget(h)
            | Command::RemoveShader(h)
            | Command::RemoveUniformBuffer(h)
            | Command::RemoveVertexBuffer(h)
            | Command::RemoveIndexBuffer(h)
            | Command::RemoveTexture(h)
            | Command::RemoveTarget(h) => {
                self.payload::<Handle>(h);
            }
            Command::InvalidateState => {}
        }
    }

    /// Decoding iterator over the recorded commands, in recording order.
    pub fn commands(&self) -> CommandReader<'_> {
        CommandReader::new(&self.words)
    }

    /// Drops every command; capacity is retained.
    pub fn clear(&mut self) {
        self.words.clear();
        self.commands = 0;
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.words.len() * 4
    }

    /// Commands pushed since the last clear.
    #[inline]
    pub fn command_count(&self) -> usize {
        self.commands
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn capacity_words(&self) -> usize {
        self.words.capacity()
    }

    /// Appends raw words, bypassing the encoder.
    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, words: &[u32]) {
        self.words.extend_from_slice(words);
    }

    fn op(&mut self, opcode: Opcode) {
        self.words.push(opcode.to_word());
        self.commands += 1;
    }

    fn payload<P: Pod>(&mut self, payload: &P) {
        self.tail(bytemuck::bytes_of(payload));
    }

    /// Appends `bytes` zero-padded to a word boundary.
    fn tail(&mut self, bytes: &[u8]) {
        let start = self.words.len();
        self.words.resize(start + words_for(bytes.len()), 0);
        let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words[start..]);
        dst[..bytes.len()].copy_from_slice(bytes);
    }

    /// Appends exactly `len` bytes: `bytes` truncated or zero-extended.
    fn tail_fitted(&mut self, bytes: &[u8], len: usize) {
        let start = self.words.len();
        self.words.resize(start + words_for(len), 0);
        let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words[start..]);
        let n = bytes.len().min(len);
        dst[..n].copy_from_slice(&bytes[..n]);
    }
}
