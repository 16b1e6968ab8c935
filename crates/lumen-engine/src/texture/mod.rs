//! Texture formats and upload sizing.
//!
//! The recorder needs exact byte counts to copy pixel data into the stream; the replayer
//! derives the same counts from the recorded payload.

mod format;

pub use format::{texture_byte_size, ColorFormat};
