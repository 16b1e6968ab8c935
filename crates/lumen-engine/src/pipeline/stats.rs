use crate::cmd::DecodeError;

/// Outcome of one [`execute`](super::BufferedRenderer::execute).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Commands dispatched to the backend.
    pub replayed: usize,
    /// Commands dropped because a handle they need never resolved.
    pub skipped: usize,
    /// Creations the backend refused.
    pub failed_creations: usize,
    /// Set when decoding stopped early; the rest of the frame was discarded.
    pub error: Option<DecodeError>,
}

impl FrameReport {
    #[inline]
    pub fn is_corrupted(&self) -> bool {
        self.error.is_some()
    }
}

/// Cumulative counters of a [`BufferedRenderer`](super::BufferedRenderer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_committed: u64,
    pub frames_pushed: u64,
    pub frames_executed: u64,
    /// Frames cleared by `commit`/`push` before the consumer saw them.
    pub frames_dropped: u64,
    pub frames_corrupted: u64,

    pub commands_recorded: u64,
    pub commands_replayed: u64,
    pub commands_skipped: u64,
    pub failed_creations: u64,
}

impl PipelineStats {
    pub(crate) fn absorb(&mut self, report: &FrameReport) {
        self.frames_executed += 1;
        self.commands_replayed += report.replayed as u64;
        self.commands_skipped += report.skipped as u64;
        self.failed_creations += report.failed_creations as u64;
        if report.is_corrupted() {
            self.frames_corrupted += 1;
        }
    }
}
