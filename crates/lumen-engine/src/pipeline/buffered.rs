use std::collections::HashMap;

use super::replay::replay;
use super::stage::Stage;
use super::{BufferedConfig, FrameReport, PipelineStats};
use crate::backend::{Limits, RenderBackend, ShaderUniform};
use crate::cmd::{Command, CommandReader};
use crate::handle::Handle;
use crate::texture::ColorFormat;

/// Backend facts sampled once at construction so the recorder never touches the backend.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Capabilities {
    pub limits: Limits,
    pub formats: [bool; ColorFormat::COUNT],
}

impl Capabilities {
    fn query(backend: &dyn RenderBackend) -> Self {
        let mut formats = [false; ColorFormat::COUNT];
        for &format in ColorFormat::ALL {
            formats[format.to_word() as usize] = backend.is_texture_format_supported(format);
        }
        Self {
            limits: backend.limits(),
            formats,
        }
    }
}

/// What the recorder remembers about the resources it handed out.
#[derive(Debug, Default)]
pub(crate) struct Bookkeeping {
    pub uniforms: HashMap<Handle, Vec<ShaderUniform>>,
    /// Byte length of vertex and index buffers.
    pub buffer_sizes: HashMap<Handle, usize>,
    pub texture_formats: HashMap<Handle, ColorFormat>,
}

impl Bookkeeping {
    pub fn forget(&mut self, handle: Handle) {
        self.uniforms.remove(&handle);
        self.buffer_sizes.remove(&handle);
        self.texture_formats.remove(&handle);
    }
}

/// Deferred renderer: records backend calls now, replays them later.
///
/// Three stages rotate recorded streams between a producer and a consumer:
///
/// ```text
///   record ─▶ current ──commit──▶ pending ──push──▶ processing ──execute──▶ backend
///                 ◀────relay────────   ◀─────relay──────   (remap + free list)
/// ```
///
/// The renderer is itself a [`RenderBackend`]: scene code records through the trait and gets a
/// virtual handle back from every creation immediately. Real handles flow back to the recorder's
/// table one stage per `push`/`commit`.
///
/// There is no internal locking. `commit`, `push` and `execute` take `&mut self`; a threaded
/// host wraps the renderer in its own synchronization and serializes them.
pub struct BufferedRenderer {
    backend: Box<dyn RenderBackend>,
    config: BufferedConfig,

    pub(crate) current: Stage,
    pending: Stage,
    processing: Stage,

    pub(crate) caps: Capabilities,
    pub(crate) books: Bookkeeping,
    pub(crate) stats: PipelineStats,
}

impl BufferedRenderer {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_config(backend, BufferedConfig::default())
    }

    pub fn with_config(backend: Box<dyn RenderBackend>, config: BufferedConfig) -> Self {
        let caps = Capabilities::query(backend.as_ref());
        log::debug!(
            "buffered renderer: {} stream words per stage, limits {:?}",
            config.initial_stream_words,
            caps.limits
        );

        Self {
            current: Stage::new(&config),
            pending: Stage::new(&config),
            processing: Stage::new(&config),
            backend,
            config,
            caps,
            books: Bookkeeping::default(),
            stats: PipelineStats::default(),
        }
    }

    /// Producer side: publishes the recorded frame.
    ///
    /// `current` and `pending` exchange streams. A frame still sitting in `pending` (never
    /// pushed) comes back to `current` and is dropped. The hand-off table's realized handles
    /// are relayed into the recorder's table.
    pub fn commit(&mut self) {
        if self.pending.table.relay_into(&mut self.current.table) {
            log::trace!("commit: remap relayed to recorder");
        }

        Stage::swap_streams(&mut self.current, &mut self.pending);
        self.stats.frames_committed += 1;

        let dropped = self.current.discard_stale();
        if dropped > 0 {
            self.frame_dropped("commit", dropped);
        }
        log::trace!("commit: {} commands pending", self.pending.stream.command_count());
    }

    /// Consumer side: takes the published frame.
    ///
    /// `pending` and `processing` exchange streams. A frame that was pushed but never executed
    /// comes back to `pending` and is dropped. The replayer's table is relayed into the hand-off
    /// table.
    pub fn push(&mut self) {
        if self.processing.table.relay_into(&mut self.pending.table) {
            log::trace!("push: remap relayed to hand-off stage");
        }

        Stage::swap_streams(&mut self.pending, &mut self.processing);
        self.stats.frames_pushed += 1;

        let dropped = self.pending.discard_stale();
        if dropped > 0 {
            self.frame_dropped("push", dropped);
        }
    }

    /// Consumer side: replays `processing` against the backend, then clears it.
    ///
    /// A corrupted stream is abandoned at the first bad word; the commands before it have
    /// already reached the backend.
    pub fn execute(&mut self) -> FrameReport {
        let report = replay(
            &self.processing.stream,
            &mut self.processing.table,
            self.backend.as_mut(),
        );
        self.processing.stream.clear();

        if let Some(err) = &report.error {
            log::error!("discarding corrupted command buffer: {err}");
        }
        if report.skipped > 0 || report.failed_creations > 0 {
            log::debug!(
                "execute: {} replayed, {} skipped, {} failed creations",
                report.replayed,
                report.skipped,
                report.failed_creations
            );
        }

        self.stats.absorb(&report);
        report
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Real handle of `handle` as currently known to the recorder.
    ///
    /// Lags the backend by up to one commit/push cycle.
    pub fn resolved(&self, handle: Handle) -> Option<Handle> {
        self.current.table.resolve(handle)
    }

    /// Size of the frame being recorded.
    pub fn recorded_bytes(&self) -> usize {
        self.current.stream.byte_len()
    }

    pub fn recorded_commands(&self) -> CommandReader<'_> {
        self.current.stream.commands()
    }

    /// The committed frame waiting for `push`.
    pub fn pending_commands(&self) -> CommandReader<'_> {
        self.pending.stream.commands()
    }

    /// The pushed frame waiting for `execute`.
    pub fn processing_commands(&self) -> CommandReader<'_> {
        self.processing.stream.commands()
    }

    pub(crate) fn record(&mut self, command: &Command<'_>) {
        self.current.stream.push(command);
        self.stats.commands_recorded += 1;
    }

    fn frame_dropped(&mut self, during: &str, commands: usize) {
        self.stats.frames_dropped += 1;
        if self.config.warn_on_dropped_frames {
            log::warn!("{during}: dropped an unconsumed frame of {commands} commands");
        }
    }
}

impl std::fmt::Debug for BufferedRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedRenderer")
            .field("recorded_bytes", &self.recorded_bytes())
            .field("handles", &self.current.table.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, CallLog, DrawState, RecordingBackend, UsageHint};

    fn renderer() -> (BufferedRenderer, CallLog) {
        let (backend, log) = RecordingBackend::new();
        (BufferedRenderer::new(Box::new(backend)), log)
    }

    fn cycle(r: &mut BufferedRenderer) -> FrameReport {
        r.commit();
        r.push();
        r.execute()
    }

    // ── stage rotation ────────────────────────────────────────────────────

    #[test]
    fn commit_moves_recording_to_pending() {
        let (mut r, log) = renderer();
        r.invalidate_cached_state();
        assert!(r.recorded_bytes() > 0);

        r.commit();
        assert_eq!(r.recorded_bytes(), 0);
        assert_eq!(r.pending_commands().count(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn stale_pending_frame_is_dropped_on_commit() {
        let (mut r, log) = renderer();
        r.invalidate_cached_state();
        r.commit();
        r.set_camera(&glam::Mat4::IDENTITY, &glam::Mat4::IDENTITY);
        r.commit();

        assert_eq!(r.recorded_bytes(), 0);
        assert_eq!(r.stats().frames_dropped, 1);

        r.push();
        r.execute();
        assert!(matches!(log.calls().as_slice(), [BackendCall::SetCamera { .. }]));
    }

    #[test]
    fn unexecuted_frame_is_dropped_on_push() {
        let (mut r, log) = renderer();
        r.invalidate_cached_state();
        r.commit();
        r.push();
        r.push();

        assert_eq!(r.stats().frames_dropped, 1);
        assert_eq!(r.processing_commands().count(), 0);
        assert_eq!(r.execute(), FrameReport::default());
        assert!(log.is_empty());
    }

    #[test]
    fn execute_clears_processing() {
        let (mut r, log) = renderer();
        r.invalidate_cached_state();
        cycle(&mut r);
        r.execute();

        assert_eq!(log.len(), 1);
        assert_eq!(r.stats().frames_executed, 2);
        assert_eq!(r.stats().commands_replayed, 1);
    }

    // ── remap relay ───────────────────────────────────────────────────────

    #[test]
    fn realized_handle_reaches_recorder_one_cycle_later() {
        let (mut r, _log) = renderer();
        let vb = r.create_vertex_buffer(&[0; 12], 12, 1, UsageHint::Static).unwrap();

        cycle(&mut r);
        assert_eq!(r.resolved(vb), None);

        // push relays processing → pending, commit relays pending → current
        r.push();
        r.commit();
        assert_eq!(r.resolved(vb), Some(Handle::new(100)));
    }

    #[test]
    fn removed_handle_is_reused_only_after_relay() {
        let (mut r, _log) = renderer();
        let a = r.create_shader("", "").unwrap();
        cycle(&mut r);

        r.remove_shader(a);
        let b = r.create_shader("", "").unwrap();
        assert_ne!(a, b);
        cycle(&mut r);

        r.push();
        r.commit();
        let c = r.create_shader("", "").unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn capabilities_are_answered_without_backend() {
        let (r, log) = renderer();
        assert_eq!(r.limits().max_target_attachments, 8);
        assert!(r.is_texture_format_supported(ColorFormat::Rgba));
        assert!(!r.is_texture_format_supported(ColorFormat::Dxt5));
        assert!(log.is_empty());
    }

    #[test]
    fn corrupted_frame_is_counted_and_next_frame_runs() {
        let (mut r, log) = renderer();
        r.current.stream.push_raw(&[0x1234_5678]);
        let report = cycle(&mut r);
        assert!(report.is_corrupted());
        assert_eq!(r.stats().frames_corrupted, 1);

        r.draw(&DrawState::default());
        r.invalidate_cached_state();
        let report = cycle(&mut r);
        assert!(!report.is_corrupted());
        assert_eq!(report.skipped, 1);
        assert_eq!(log.calls(), vec![BackendCall::InvalidateCachedState]);
    }
}
