//! Triple-buffered deferred rendering.
//!
//! [`BufferedRenderer`] records [`RenderBackend`](crate::backend::RenderBackend) calls into a
//! command stream, hands finished frames from producer to consumer through three rotating
//! stages, and replays them against the real backend while resolving virtual handles.

mod buffered;
mod config;
mod record;
mod replay;
mod stage;
mod stats;

pub use buffered::BufferedRenderer;
pub use config::BufferedConfig;
pub use stats::{FrameReport, PipelineStats};
