use super::FrameReport;
use crate::backend::{DrawState, RenderBackend, TargetDesc};
use crate::cmd::{Command, CommandStream};
use crate::handle::{Handle, HandleTable};

/// Replays one recorded frame against `backend`.
///
/// Virtual handles are remapped through `table`; creations and removals write their outcome
/// back into it. A command that depends on an unresolved resource is skipped. Decoding stops at
/// the first corrupt word and the error is returned in the report.
pub(crate) fn replay(stream: &CommandStream, table: &mut HandleTable, backend: &mut dyn RenderBackend) -> FrameReport {
    let mut replayer = Replayer {
        table,
        backend,
        report: FrameReport::default(),
    };

    for command in stream.commands() {
        match command {
            Ok(command) => replayer.dispatch(command),
            Err(err) => {
                replayer.report.error = Some(err);
                break;
            }
        }
    }

    replayer.report
}

struct Replayer<'t, 'b> {
    table: &'t mut HandleTable,
    backend: &'b mut dyn RenderBackend,
    report: FrameReport,
}

impl Replayer<'_, '_> {
    fn dispatch(&mut self, command: Command<'_>) {
        log::trace!("replay {:?}", command.opcode());

        let done = match command {
            Command::Clear { mut viewport, flags } => self.optional(&mut viewport.target).map(|()| {
                self.backend.clear(&viewport, flags);
            }),
            Command::Camera { modelview, projection } => {
                self.backend.set_camera(&modelview, &projection);
                Some(())
            }
            Command::ApplyState(mut state) => {
                state.for_each_handle_mut(|h| *h = self.table.remap(*h));
                self.backend.apply_state(&state);
                Some(())
            }
            Command::Draw(state) => self.draw_state(state).map(|state| self.backend.draw(&state)),
            Command::SetUniform { buffer, index, values } => self
                .resolve(buffer)
                .map(|b| self.backend.set_uniform(b, index, values)),
            Command::ResolveTarget(target) => self.resolve(target).map(|t| self.backend.resolve_target(t)),

            Command::CreateShader { handle, vertex, fragment } => {
                let real = self.backend.create_shader(vertex, fragment);
                self.realize(handle, real)
            }
            Command::RemoveShader(handle) => self.remove(handle, |b, h| b.remove_shader(h)),
            Command::CreateUniformBuffer { handle, shader } => self.resolve(shader).map(|shader| {
                let real = self.backend.create_uniform_buffer(shader);
                self.realize(handle, real);
            }),
            Command::RemoveUniformBuffer(handle) => self.remove(handle, |b, h| b.remove_uniform_buffer(h)),

            Command::CreateVertexBuffer { handle, stride, count, usage, data } => {
                let real = self.backend.create_vertex_buffer(data, stride, count, usage);
                self.realize(handle, real)
            }
            Command::SetVertexLayout { buffer, layout } => self
                .resolve(buffer)
                .map(|b| self.backend.set_vertex_layout(b, &layout)),
            Command::UpdateVertexBuffer { buffer, data } => self
                .resolve(buffer)
                .map(|b| self.backend.update_vertex_buffer(b, data)),
            Command::RemoveVertexBuffer(handle) => self.remove(handle, |b, h| b.remove_vertex_buffer(h)),

            Command::CreateIndexBuffer { handle, size, count, usage, data } => {
                let real = self.backend.create_index_buffer(data, size, count, usage);
                self.realize(handle, real)
            }
            Command::UpdateIndexBuffer { buffer, data } => self
                .resolve(buffer)
                .map(|b| self.backend.update_index_buffer(b, data)),
            Command::RemoveIndexBuffer(handle) => self.remove(handle, |b, h| b.remove_index_buffer(h)),

            Command::CreateTexture { handle, width, height, format, mip_count, data } => {
                let real = self.backend.create_texture(data, width, height, format, mip_count);
                self.realize(handle, real)
            }
            Command::CreateCubemap { handle, width, format, mip_count, faces } => {
                let real = self.backend.create_cubemap(faces, width, format, mip_count);
                self.realize(handle, real)
            }
            Command::UpdateTexture { texture, region, mip, data } => self
                .resolve(texture)
                .map(|t| self.backend.update_texture(t, data, region, mip)),
            Command::SetTextureWrap { texture, s, t } => self
                .resolve(texture)
                .map(|tex| self.backend.set_texture_wrap(tex, s, t)),
            Command::SetTextureFilter { texture, filter } => self
                .resolve(texture)
                .map(|t| self.backend.set_texture_filter(t, filter)),
            Command::RemoveTexture(handle) => self.remove(handle, |b, h| b.remove_texture(h)),

            Command::CreateTarget { handle, desc } => self.target_desc(desc).map(|desc| {
                let real = self.backend.create_target(&desc);
                self.realize(handle, real);
            }),
            Command::RemoveTarget(handle) => self.remove(handle, |b, h| b.remove_target(h)),

            Command::InvalidateState => {
                self.backend.invalidate_cached_state();
                Some(())
            }
        };

        match done {
            Some(()) => self.report.replayed += 1,
            None => self.report.skipped += 1,
        }
    }

    fn resolve(&self, handle: Handle) -> Option<Handle> {
        let real = self.table.resolve(handle);
        if real.is_none() {
            log::debug!("skipping command: {handle:?} is unresolved");
        }
        real
    }

    /// Remaps a handle that may legitimately be unset; fails only if it is set and unresolved.
    fn optional(&self, handle: &mut Handle) -> Option<()> {
        if handle.is_some() {
            *handle = self.resolve(*handle)?;
        }
        Some(())
    }

    fn realize(&mut self, handle: Handle, real: Option<Handle>) -> Option<()> {
        if real.is_none() {
            log::debug!("backend failed to create {handle:?}; it stays unresolved");
            self.report.failed_creations += 1;
        }
        self.table.realize(handle, real);
        Some(())
    }

    fn remove(&mut self, handle: Handle, remove: impl FnOnce(&mut dyn RenderBackend, Handle)) -> Option<()> {
        let real = self.resolve(handle)?;
        remove(&mut *self.backend, real);
        self.table.release(handle);
        Some(())
    }

    /// Geometry, shader and target must resolve; textures and uniforms fall back to unbound.
    fn draw_state(&self, mut state: DrawState) -> Option<DrawState> {
        state.vertex_buffer = self.resolve(state.vertex_buffer)?;
        state.shader = self.resolve(state.shader)?;
        self.optional(&mut state.index_buffer)?;
        self.optional(&mut state.viewport.target)?;

        state.uniform_buffer = self.table.remap(state.uniform_buffer);
        for texture in &mut state.textures {
            *texture = self.table.remap(*texture);
        }
        Some(state)
    }

    /// Every attachment that is set must resolve and name a real cubemap face.
    fn target_desc(&self, mut desc: TargetDesc) -> Option<TargetDesc> {
        for attachment in &mut desc.attachments {
            if !attachment.is_valid() {
                log::debug!("skipping target: invalid {attachment:?}");
                return None;
            }
            self.optional(&mut attachment.texture)?;
        }
        self.optional(&mut desc.depth)?;
        Some(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, RecordingBackend, TargetAttachment, UsageHint};

    #[test]
    fn creation_realizes_and_removal_releases() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        let mut stream = CommandStream::new();
        let vb = Handle::new(0);

        stream.push(&Command::CreateVertexBuffer {
            handle: vb,
            stride: 4,
            count: 1,
            usage: UsageHint::Static,
            data: &[1, 2, 3, 4],
        });
        stream.push(&Command::UpdateVertexBuffer { buffer: vb, data: &[5, 6, 7, 8] });
        stream.push(&Command::RemoveVertexBuffer(vb));

        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.replayed, 3);
        assert_eq!(report.skipped, 0);

        let calls = log.take();
        let BackendCall::CreateVertexBuffer { handle: Some(real), .. } = calls[0] else { panic!("{calls:?}") };
        assert_eq!(calls[1], BackendCall::UpdateVertexBuffer { buffer: real, data: vec![5, 6, 7, 8] });
        assert_eq!(calls[2], BackendCall::RemoveVertexBuffer(real));

        assert_eq!(table.resolve(vb), None);
        assert_eq!(table.free_handles(), &[vb]);
    }

    #[test]
    fn handle_recreated_in_the_same_frame_is_not_left_free() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        let shader = Handle::new(0);

        let mut first = CommandStream::new();
        first.push(&Command::CreateShader { handle: shader, vertex: "v", fragment: "f" });
        replay(&first, &mut table, &mut backend);
        assert_eq!(table.resolve(shader), Some(Handle::new(100)));

        let mut second = CommandStream::new();
        second.push(&Command::RemoveShader(shader));
        second.push(&Command::CreateShader { handle: shader, vertex: "v", fragment: "f" });
        let report = replay(&second, &mut table, &mut backend);
        assert_eq!(report.replayed, 2);

        assert_eq!(table.resolve(shader), Some(Handle::new(101)));
        assert!(table.free_handles().is_empty(), "{shader} is both live and free");

        let calls = log.take();
        assert_eq!(calls[1], BackendCall::RemoveShader(Handle::new(100)));
        assert!(matches!(calls[2], BackendCall::CreateShader { handle: Some(h), .. } if h == Handle::new(101)));
    }

    #[test]
    fn target_with_out_of_range_face_is_skipped() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        table.realize(Handle::new(0), Some(Handle::new(60)));

        let mut desc = TargetDesc::default();
        desc.attachments.push(TargetAttachment::cube_face(Handle::new(0), 6));

        let mut stream = CommandStream::new();
        stream.push(&Command::CreateTarget { handle: Handle::new(1), desc });
        stream.push(&Command::InvalidateState);

        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.replayed, 1);
        assert!(!report.is_corrupted());
        assert_eq!(table.resolve(Handle::new(1)), None);
        assert_eq!(log.take(), vec![BackendCall::InvalidateCachedState]);
    }

    #[test]
    fn draw_needs_geometry_and_shader() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        let mut stream = CommandStream::new();

        let mut state = DrawState::default();
        state.vertex_buffer = Handle::new(0);
        state.shader = Handle::new(1);
        stream.push(&Command::Draw(state));
        stream.push(&Command::ApplyState(state));

        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.replayed, 1);

        // apply-state goes through with everything unbound
        let calls = log.take();
        assert_eq!(calls.len(), 1);
        let BackendCall::ApplyState(applied) = &calls[0] else { panic!("{calls:?}") };
        assert!(applied.vertex_buffer.is_none());
        assert!(applied.shader.is_none());
    }

    #[test]
    fn unresolved_textures_are_unbound_not_fatal() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        table.realize(Handle::new(0), Some(Handle::new(50)));
        table.realize(Handle::new(1), Some(Handle::new(51)));

        let mut state = DrawState::default();
        state.vertex_buffer = Handle::new(0);
        state.shader = Handle::new(1);
        state.textures[0] = Handle::new(7);
        state.uniform_buffer = Handle::new(8);

        let mut stream = CommandStream::new();
        stream.push(&Command::Draw(state));
        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.replayed, 1);

        let calls = log.take();
        let BackendCall::Draw(drawn) = &calls[0] else { panic!("{calls:?}") };
        assert_eq!(drawn.vertex_buffer, Handle::new(50));
        assert_eq!(drawn.shader, Handle::new(51));
        assert!(drawn.textures[0].is_none());
        assert!(drawn.uniform_buffer.is_none());
    }

    #[test]
    fn failed_creation_stays_unresolved() {
        let (mut backend, log) = RecordingBackend::new();
        backend.set_failing_creations(true);
        let mut table = HandleTable::new();
        let mut stream = CommandStream::new();
        let shader = Handle::new(0);

        stream.push(&Command::CreateShader { handle: shader, vertex: "", fragment: "" });
        stream.push(&Command::CreateUniformBuffer { handle: Handle::new(1), shader });
        stream.push(&Command::RemoveShader(shader));

        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.failed_creations, 1);
        assert_eq!(report.replayed, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(table.resolve(shader), None);
        assert!(table.free_handles().is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn corruption_stops_replay_after_valid_prefix() {
        let (mut backend, log) = RecordingBackend::new();
        let mut table = HandleTable::new();
        let mut stream = CommandStream::new();
        stream.push(&Command::InvalidateState);
        stream.push_raw(&[0]);
        stream.push(&Command::InvalidateState);

        let report = replay(&stream, &mut table, &mut backend);
        assert_eq!(report.replayed, 1);
        assert!(report.is_corrupted());
        assert_eq!(log.len(), 1);
    }
}
