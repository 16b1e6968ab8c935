//! Coordinate types shared by the backend interface and recorded payloads.
//!
//! Canonical space:
//! - Framebuffer pixels
//! - Origin bottom-left
//! - Integer extents

mod rect;

pub use rect::Rect;
