use core::fmt;

use bytemuck::{Pod, Zeroable};

/// Identifier of a GPU resource (shader, buffer, texture, target, uniform block).
///
/// The same type carries both sides of the indirection:
/// - recorder side: a *virtual* handle minted by [`HandleTable`](super::HandleTable)
/// - backend side: the *real* handle a [`RenderBackend`](crate::backend::RenderBackend) returned
///
/// The raw value `-1` is reserved for [`Handle::NONE`] ("no resource bound" / "unresolved").
/// The layout is a single `i32` so handles can sit inside recorded payloads.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
pub struct Handle(i32);

impl Handle {
    /// Absent / unresolved handle.
    pub const NONE: Handle = Handle(-1);

    /// Creates a handle from a slot index.
    ///
    /// # Panics
    /// Panics if `index` does not fit a non-negative `i32`.
    #[inline]
    pub fn new(index: usize) -> Self {
        let raw = i32::try_from(index).expect("handle index exceeds i32::MAX");
        Self(raw)
    }

    /// Reinterprets a raw wire value. Negative values map to [`Handle::NONE`].
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 { Self::NONE } else { Self(raw) }
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 >= 0
    }

    /// Slot index, or `None` for [`Handle::NONE`].
    #[inline]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// Converts `Option<Handle>` into the in-payload representation.
    #[inline]
    pub fn from_option(handle: Option<Handle>) -> Self {
        handle.unwrap_or(Self::NONE)
    }

    #[inline]
    pub fn to_option(self) -> Option<Handle> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl Default for Handle {
    #[inline]
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("Handle(none)")
        } else {
            write!(f, "Handle({})", self.0)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() { f.write_str("none") } else { write!(f, "#{}", self.0) }
    }
}
