//! Lumen engine crate.
//!
//! Deferred command-buffer layer between scene code and a GPU backend: calls are recorded into
//! compact word streams with virtual resource handles, rotated through a triple buffer and
//! replayed on the consumer side.

#[macro_use]
mod macros;

pub mod backend;
pub mod cmd;
pub mod coords;
pub mod handle;
pub mod logging;
pub mod pipeline;
pub mod shader;
pub mod texture;

pub use backend::RenderBackend;
pub use handle::Handle;
pub use pipeline::{BufferedConfig, BufferedRenderer, FrameReport, PipelineStats};
