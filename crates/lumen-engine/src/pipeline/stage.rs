use super::BufferedConfig;
use crate::cmd::CommandStream;
use crate::handle::HandleTable;

/// One slot of the triple buffer: a recorded stream plus this role's remap-table copy.
///
/// Streams move between stages; tables never do. Each table belongs to a role (recorder,
/// hand-off, replayer) and only receives data through a relay.
#[derive(Debug, Default)]
pub(crate) struct Stage {
    pub stream: CommandStream,
    pub table: HandleTable,
}

impl Stage {
    pub fn new(config: &BufferedConfig) -> Self {
        Self {
            stream: CommandStream::with_capacity(config.initial_stream_words),
            table: HandleTable::with_capacity(config.initial_handle_capacity),
        }
    }

    pub fn swap_streams(a: &mut Stage, b: &mut Stage) {
        std::mem::swap(&mut a.stream, &mut b.stream);
    }

    /// Clears a stream nobody consumed. Returns the number of commands thrown away.
    pub fn discard_stale(&mut self) -> usize {
        let dropped = self.stream.command_count();
        self.stream.clear();
        dropped
    }
}
