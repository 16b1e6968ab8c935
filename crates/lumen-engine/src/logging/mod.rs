//! Logging setup.
//!
//! Library code only talks to the `log` facade. Binaries and tests call [`init_logging`] once
//! to install `env_logger`.
//!
//! Levels used by the engine:
//! - `error`: corrupted command streams (the frame is dropped)
//! - `warn`: dropped frames, payload size mismatches, unsupported read-backs
//! - `debug`: failed resource creation, skipped commands
//! - `trace`: per-command replay

mod init;

pub use init::{init_logging, LoggingConfig};
