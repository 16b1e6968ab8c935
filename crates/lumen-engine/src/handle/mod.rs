//! Resource handle virtualization.
//!
//! Responsibilities:
//! - mint virtual handles synchronously, before the backend resource exists
//! - map virtual handles to real backend handles once creation has been replayed
//! - recycle handles through a free list after their removal has been replayed

mod id;
mod table;

pub use id::Handle;
pub use table::{HandleTable, UNRESOLVED};
