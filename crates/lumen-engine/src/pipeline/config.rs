/// Construction options for [`BufferedRenderer`](super::BufferedRenderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedConfig {
    /// Words reserved up front in each of the three stage streams.
    pub initial_stream_words: usize,
    /// Slots reserved up front in each remap table.
    pub initial_handle_capacity: usize,
    /// Log a warning whenever `commit` or `push` discards an unconsumed frame.
    pub warn_on_dropped_frames: bool,
}

impl Default for BufferedConfig {
    fn default() -> Self {
        Self {
            initial_stream_words: 16 * 1024,
            initial_handle_capacity: 256,
            warn_on_dropped_frames: true,
        }
    }
}
