use bytemuck::Pod;
use glam::Mat4;

use super::payload::{
    BufferUpdateWire, CameraWire, ClearWire, DrawWire, FieldError, IndexBufferWire, ShaderWire,
    TargetWire, TextureFilterWire, TextureUpdateWire, TextureWire, TextureWrapWire,
    UniformBufferWire, UniformWire, VertexBufferWire, VertexLayoutWire,
};
use super::stream::words_for;
use super::{Command, DecodeError, Opcode};
use crate::backend::{ClearFlags, IndexSize, UsageHint};
use crate::handle::Handle;
use crate::texture::ColorFormat;

/// Sequential decoder over an encoded word stream.
///
/// Yields commands in recording order. The first malformed command yields one `Err` and ends
/// the iteration: nothing after a corrupt word can be trusted.
#[derive(Debug, Clone)]
pub struct CommandReader<'a> {
    words: &'a [u32],
    cursor: usize,
    failed: bool,
}

impl<'a> CommandReader<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self {
            words,
            cursor: 0,
            failed: false,
        }
    }

    /// Word offset of the next command.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    fn decode_one(&mut self) -> Result<Command<'a>, DecodeError> {
        let at_word = self.cursor;
        let word = self.words[at_word];
        let opcode = Opcode::from_word(word).ok_or(DecodeError::UnknownOpcode { word, at_word })?;
        self.cursor += 1;

        let mut cmd = Cursor {
            words: self.words,
            pos: self.cursor,
            opcode,
            at_word,
        };
        let command = cmd.command()?;
        self.cursor = cmd.pos;
        Ok(command)
    }
}

impl<'a> Iterator for CommandReader<'a> {
    type Item = Result<Command<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.words.len() {
            return None;
        }
        let result = self.decode_one();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Read position inside one command.
struct Cursor<'a> {
    words: &'a [u32],
    pos: usize,
    opcode: Opcode,
    at_word: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u32], DecodeError> {
        let remaining = self.words.len() - self.pos;
        if n > remaining {
            return Err(DecodeError::Truncated {
                opcode: self.opcode,
                at_word: self.at_word,
                needed: n,
                remaining,
            });
        }
        let words = &self.words[self.pos..self.pos + n];
        self.pos += n;
        Ok(words)
    }

    fn payload<P: Pod>(&mut self) -> Result<P, DecodeError> {
        let size = size_of::<P>();
        let words = self.take(words_for(size))?;
        let bytes: &[u8] = bytemuck::cast_slice(words);
        Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
    }

    /// A byte tail of `len` bytes plus its padding.
    fn bytes(&mut self, len: u64) -> Result<&'a [u8], DecodeError> {
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        let words = self.take(words_for(len))?;
        let bytes: &'a [u8] = bytemuck::cast_slice(words);
        Ok(&bytes[..len])
    }

    fn text(&mut self, len: u32) -> Result<&'a str, DecodeError> {
        let bytes = self.bytes(u64::from(len))?;
        core::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
            opcode: self.opcode,
            at_word: self.at_word,
        })
    }

    fn check<T>(&self, result: Result<T, FieldError>) -> Result<T, DecodeError> {
        result.map_err(|FieldError { field, value }| DecodeError::InvalidField {
            opcode: self.opcode,
            field,
            value,
            at_word: self.at_word,
        })
    }

    fn field<T>(&self, field: &'static str, value: u32, parse: fn(u32) -> Option<T>) -> Result<T, DecodeError> {
        self.check(parse(value).ok_or(FieldError { field, value }))
    }

    fn handle(&mut self) -> Result<Handle, DecodeError> {
        self.payload::<Handle>()
    }

    fn command(&mut self) -> Result<Command<'a>, DecodeError> {
        Ok(match self.opcode {
            Opcode::Clear => {
                let wire: ClearWire = self.payload()?;
                Command::Clear {
                    viewport: wire.viewport.decode(),
                    flags: ClearFlags {
                        color: wire.flags & 1 != 0,
                        depth: wire.flags & 2 != 0,
                        stencil: wire.flags & 4 != 0,
                    },
                }
            }
            Opcode::Camera => {
                let wire: CameraWire = self.payload()?;
                Command::Camera {
                    modelview: Mat4::from_cols_array(&wire.modelview),
                    projection: Mat4::from_cols_array(&wire.projection),
                }
            }
            Opcode::ApplyState => {
                let wire: DrawWire = self.payload()?;
                Command::ApplyState(self.check(wire.decode())?)
            }
            Opcode::Draw => {
                let wire: DrawWire = self.payload()?;
                Command::Draw(self.check(wire.decode())?)
            }
            Opcode::SetUniform => {
                let wire: UniformWire = self.payload()?;
                let values = self.take(wire.count as usize)?;
                Command::SetUniform {
                    buffer: wire.buffer,
                    index: wire.index,
                    values: bytemuck::cast_slice(values),
                }
            }
            Opcode::ResolveTarget => Command::ResolveTarget(self.handle()?),

            Opcode::CreateShader => {
                let wire: ShaderWire = self.payload()?;
                Command::CreateShader {
                    handle: wire.handle,
                    vertex: self.text(wire.vertex_len)?,
                    fragment: self.text(wire.fragment_len)?,
                }
            }
            Opcode::RemoveShader => Command::RemoveShader(self.handle()?),
            Opcode::CreateUniformBuffer => {
                let wire: UniformBufferWire = self.payload()?;
                Command::CreateUniformBuffer {
                    handle: wire.handle,
                    shader: wire.shader,
                }
            }
            Opcode::RemoveUniformBuffer => Command::RemoveUniformBuffer(self.handle()?),

            Opcode::CreateVertexBuffer => {
                let wire: VertexBufferWire = self.payload()?;
                let usage = self.field("usage", wire.usage, UsageHint::from_word)?;
                Command::CreateVertexBuffer {
                    handle: wire.handle,
                    stride: wire.stride,
                    count: wire.count,
                    usage,
                    data: self.bytes(u64::from(wire.stride) * u64::from(wire.count))?,
                }
            }
            Opcode::SetVertexLayout => {
                let wire: VertexLayoutWire = self.payload()?;
                Command::SetVertexLayout {
                    buffer: wire.buffer,
                    layout: self.check(wire.decode())?,
                }
            }
            Opcode::UpdateVertexBuffer => {
                let wire: BufferUpdateWire = self.payload()?;
                Command::UpdateVertexBuffer {
                    buffer: wire.buffer,
                    data: self.bytes(u64::from(wire.byte_len))?,
                }
            }
            Opcode::RemoveVertexBuffer => Command::RemoveVertexBuffer(self.handle()?),

            Opcode::CreateIndexBuffer => {
                let wire: IndexBufferWire = self.payload()?;
                let size = self.field("index_size", wire.size, IndexSize::from_word)?;
                let usage = self.field("usage", wire.usage, UsageHint::from_word)?;
                Command::CreateIndexBuffer {
                    handle: wire.handle,
                    size,
                    count: wire.count,
                    usage,
                    data: self.bytes(u64::from(size.bytes()) * u64::from(wire.count))?,
                }
            }
            Opcode::UpdateIndexBuffer => {
                let wire: BufferUpdateWire = self.payload()?;
                Command::UpdateIndexBuffer {
                    buffer: wire.buffer,
                    data: self.bytes(u64::from(wire.byte_len))?,
                }
            }
            Opcode::RemoveIndexBuffer => Command::RemoveIndexBuffer(self.handle()?),

            Opcode::CreateTexture => {
                let wire: TextureWire = self.payload()?;
                let format = self.field("format", wire.format, ColorFormat::from_word)?;
                let data = match wire.byte_len {
                    0 => None,
                    len => Some(self.bytes(u64::from(len))?),
                };
                Command::CreateTexture {
                    handle: wire.handle,
                    width: wire.width,
                    height: wire.height,
                    format,
                    mip_count: wire.mip_count,
                    data,
                }
            }
            Opcode::CreateCubemap => {
                let wire: TextureWire = self.payload()?;
                let format = self.field("format", wire.format, ColorFormat::from_word)?;
                let faces = match wire.byte_len {
                    0 => None,
                    len => {
                        let len = u64::from(len);
                        Some([
                            self.bytes(len)?,
                            self.bytes(len)?,
                            self.bytes(len)?,
                            self.bytes(len)?,
                            self.bytes(len)?,
                            self.bytes(len)?,
                        ])
                    }
                };
                Command::CreateCubemap {
                    handle: wire.handle,
                    width: wire.width,
                    format,
                    mip_count: wire.mip_count,
                    faces,
                }
            }
            Opcode::UpdateTexture => {
                let wire: TextureUpdateWire = self.payload()?;
                Command::UpdateTexture {
                    texture: wire.texture,
                    region: wire.region(),
                    mip: wire.mip,
                    data: self.bytes(u64::from(wire.byte_len))?,
                }
            }
            Opcode::SetTextureWrap => {
                let wire: TextureWrapWire = self.payload()?;
                let (s, t) = self.check(wire.decode())?;
                Command::SetTextureWrap {
                    texture: wire.texture,
                    s,
                    t,
                }
            }
            Opcode::SetTextureFilter => {
                let wire: TextureFilterWire = self.payload()?;
                Command::SetTextureFilter {
                    texture: wire.texture,
                    filter: self.check(wire.decode())?,
                }
            }
            Opcode::RemoveTexture => Command::RemoveTexture(self.handle()?),

            Opcode::CreateTarget => {
                let wire: TargetWire = self.payload()?;
                Command::CreateTarget {
                    handle: wire.handle,
                    desc: self.check(wire.decode())?,
                }
            }
            Opcode::RemoveTarget => Command::RemoveTarget(self.handle()?),

            Opcode::InvalidateState => Command::InvalidateState,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        Blend, DrawState, Filter, Primitive, TargetAttachment, TargetDesc, TextureFilter,
        TextureRegion, VertexLayout, ViewportState, Wrap,
    };
    use crate::cmd::CommandStream;
    use crate::coords::Rect;

    fn h(i: usize) -> Handle {
        Handle::new(i)
    }

    fn decode_all(stream: &CommandStream) -> Vec<Command<'_>> {
        stream.commands().collect::<Result<_, _>>().unwrap()
    }

    // ── round trips ───────────────────────────────────────────────────────

    #[test]
    fn frame_commands_decode_in_order() {
        let mut draw = DrawState::default();
        draw.vertex_buffer = h(1);
        draw.index_buffer = h(2);
        draw.shader = h(3);
        draw.primitive = Primitive::LineStrip;
        draw.index_count = 36;
        draw.blend = Some(Blend::alpha());

        let viewport = ViewportState {
            viewport: Rect::from_size(640, 480),
            scissor: Some(Rect::new(10, 10, 20, 20)),
            clear_color: [0.1, 0.2, 0.3, 1.0],
            ..Default::default()
        };

        let commands = vec![
            Command::Clear { viewport, flags: ClearFlags::ALL },
            Command::Camera {
                modelview: Mat4::from_translation(glam::vec3(1.0, 2.0, 3.0)),
                projection: Mat4::orthographic_rh(0.0, 640.0, 0.0, 480.0, -1.0, 1.0),
            },
            Command::SetUniform { buffer: h(4), index: 2, values: &[1.0, -2.5, 3.25] },
            Command::ApplyState(draw),
            Command::Draw(draw),
            Command::ResolveTarget(h(5)),
            Command::InvalidateState,
        ];

        let mut stream = CommandStream::new();
        for c in &commands {
            stream.push(c);
        }

        assert_eq!(stream.command_count(), commands.len());
        assert_eq!(decode_all(&stream), commands);
    }

    #[test]
    fn resource_commands_keep_their_tails() {
        let vertices: Vec<u8> = (0..24).collect();
        let faces: [&[u8]; 6] = [&[1; 16], &[2; 16], &[3; 16], &[4; 16], &[5; 16], &[6; 16]];
        let desc = TargetDesc {
            width: 256,
            height: 256,
            samples: 4,
            attachments: vec![TargetAttachment::texture(h(7)), TargetAttachment::cube_face(h(8), 2)],
            depth: h(9),
        };

        let commands = vec![
            Command::CreateShader { handle: h(0), vertex: "void main() {}", fragment: "ünï" },
            Command::CreateUniformBuffer { handle: h(1), shader: h(0) },
            Command::CreateVertexBuffer {
                handle: h(2),
                stride: 12,
                count: 2,
                usage: UsageHint::Dynamic,
                data: &vertices,
            },
            Command::SetVertexLayout { buffer: h(2), layout: VertexLayout::default() },
            Command::UpdateVertexBuffer { buffer: h(2), data: &vertices[..5] },
            Command::CreateIndexBuffer {
                handle: h(3),
                size: IndexSize::U16,
                count: 3,
                usage: UsageHint::Static,
                data: &[0, 0, 1, 0, 2, 0],
            },
            Command::UpdateIndexBuffer { buffer: h(3), data: &[2, 0, 1, 0, 0] },
            Command::CreateTexture {
                handle: h(4),
                width: 2,
                height: 2,
                format: ColorFormat::Rgba,
                mip_count: 1,
                data: Some(&[9u8; 16][..]),
            },
            Command::CreateTexture {
                handle: h(5),
                width: 64,
                height: 64,
                format: ColorFormat::Depth24,
                mip_count: 1,
                data: None,
            },
            Command::CreateCubemap {
                handle: h(6),
                width: 2,
                format: ColorFormat::Rgba,
                mip_count: 1,
                faces: Some(faces),
            },
            Command::UpdateTexture {
                texture: h(4),
                region: TextureRegion::new(1, 0, 1, 1),
                mip: 0,
                data: &[1, 2, 3],
            },
            Command::SetTextureWrap { texture: h(4), s: Wrap::Repeat, t: Wrap::RepeatMirror },
            Command::SetTextureFilter {
                texture: h(4),
                filter: TextureFilter { minification: Filter::Nearest, anisotropy: 8, ..Default::default() },
            },
            Command::CreateTarget { handle: h(10), desc },
            Command::RemoveTarget(h(10)),
            Command::RemoveTexture(h(4)),
            Command::RemoveIndexBuffer(h(3)),
            Command::RemoveVertexBuffer(h(2)),
            Command::RemoveUniformBuffer(h(1)),
            Command::RemoveShader(h(0)),
        ];

        let mut stream = CommandStream::new();
        for c in &commands {
            stream.push(c);
        }
        assert_eq!(decode_all(&stream), commands);
    }

    #[test]
    fn buffer_data_is_fitted_to_declared_size() {
        let mut stream = CommandStream::new();
        stream.push(&Command::CreateVertexBuffer {
            handle: h(0),
            stride: 4,
            count: 3,
            usage: UsageHint::Static,
            data: &[7; 5],
        });
        stream.push(&Command::CreateIndexBuffer {
            handle: h(1),
            size: IndexSize::U32,
            count: 1,
            usage: UsageHint::Static,
            data: &[1; 10],
        });

        let decoded = decode_all(&stream);
        let Command::CreateVertexBuffer { data, .. } = decoded[0] else { panic!() };
        assert_eq!(data, &[7, 7, 7, 7, 7, 0, 0, 0, 0, 0, 0, 0]);
        let Command::CreateIndexBuffer { data, .. } = decoded[1] else { panic!() };
        assert_eq!(data, &[1, 1, 1, 1]);
    }

    #[test]
    fn tails_are_padded_to_words() {
        let mut stream = CommandStream::new();
        stream.push(&Command::UpdateIndexBuffer { buffer: h(0), data: &[1, 2, 3, 4, 5] });
        // opcode + 2 payload words + 2 tail words
        assert_eq!(stream.len_words(), 5);
        assert_eq!(stream.byte_len(), 20);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut stream = CommandStream::with_capacity(4);
        for _ in 0..100 {
            stream.push(&Command::InvalidateState);
        }
        let capacity = stream.capacity_words();
        stream.clear();
        assert!(stream.is_empty());
        assert_eq!(stream.command_count(), 0);
        assert_eq!(stream.capacity_words(), capacity);
        assert_eq!(stream.commands().count(), 0);
    }

    // ── corruption ────────────────────────────────────────────────────────

    #[test]
    fn unknown_opcode_stops_iteration() {
        let mut stream = CommandStream::new();
        stream.push(&Command::InvalidateState);
        stream.push_raw(&[0xDEAD_BEEF]);
        stream.push(&Command::InvalidateState);

        let mut reader = stream.commands();
        assert_eq!(reader.next(), Some(Ok(Command::InvalidateState)));
        assert_eq!(
            reader.next(),
            Some(Err(DecodeError::UnknownOpcode { word: 0xDEAD_BEEF, at_word: 1 }))
        );
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn truncated_payload_is_reported() {
        let mut stream = CommandStream::new();
        stream.push_raw(&[Opcode::RemoveTexture.to_word()]);

        let err = stream.commands().next().unwrap().unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated { opcode: Opcode::RemoveTexture, at_word: 0, needed: 1, remaining: 0 }
        );
    }

    #[test]
    fn oversized_tail_is_truncation_not_panic() {
        let mut stream = CommandStream::new();
        // create vertex buffer claiming u32::MAX * u32::MAX bytes
        stream.push_raw(&[Opcode::CreateVertexBuffer.to_word(), 0, u32::MAX, u32::MAX, 0]);

        let err = stream.commands().next().unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { opcode: Opcode::CreateVertexBuffer, .. }));
    }

    #[test]
    fn invalid_enum_field_is_reported() {
        let mut stream = CommandStream::new();
        stream.push(&Command::SetTextureWrap { texture: h(0), s: Wrap::Clamp, t: Wrap::Clamp });
        let mut words = stream.words().to_vec();
        words[3] = 42;

        let err = CommandReader::new(&words).next().unwrap().unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField { opcode: Opcode::SetTextureWrap, field: "wrap_t", value: 42, at_word: 0 }
        );
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut stream = CommandStream::new();
        stream.push_raw(&[Opcode::CreateShader.to_word(), 0, 1, 0, 0xFF]);

        let err = stream.commands().next().unwrap().unwrap_err();
        assert_eq!(err, DecodeError::InvalidUtf8 { opcode: Opcode::CreateShader, at_word: 0 });
        assert_eq!(err.at_word(), 0);
    }
}
