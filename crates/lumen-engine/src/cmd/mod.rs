//! Command encoding.
//!
//! Recorded backend calls live in a flat `Vec<u32>` per pipeline stage: an [`Opcode`] word,
//! a fixed `bytemuck` payload and optional padded byte tails. [`CommandStream`] writes it,
//! [`CommandReader`] walks it back as typed [`Command`]s.

mod command;
mod error;
mod opcode;
mod payload;
mod reader;
mod stream;

pub use command::Command;
pub use error::DecodeError;
pub use opcode::Opcode;
pub use reader::CommandReader;
pub use stream::CommandStream;
