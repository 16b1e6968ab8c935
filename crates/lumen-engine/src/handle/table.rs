use super::Handle;

/// Raw remap value of a slot whose resource does not exist on the backend (yet).
pub const UNRESOLVED: i32 = -1;

/// Virtual handle allocator + virtual → real remap table.
///
/// Every pipeline stage owns one copy:
/// - the recorder's copy allocates handles and is otherwise read-only
/// - the replayer's copy is the only one that writes resolved values and releases handles
/// - the copies converge by [`relay_into`](Self::relay_into), always consumer → producer
///
/// Performance characteristics:
/// - `allocate()` is O(1) amortized (free list first, then growth)
/// - `resolve()` is a bounds-checked index
/// - `relay_into()` is O(slots) and only runs when the source changed
#[derive(Debug, Clone, Default)]
pub struct HandleTable {
    /// Indexed by virtual handle. Real handle (>= 0) or [`UNRESOLVED`].
    slots: Vec<i32>,

    /// Handles whose removal has been replayed and that may be reused.
    free: Vec<Handle>,

    /// Set when values or the free list changed since the last relay.
    changed: bool,
}

impl HandleTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            changed: false,
        }
    }

    /// Mints a virtual handle.
    ///
    /// Reuses the most recently returned handle when the free list is non-empty, otherwise grows
    /// the table by one unresolved slot.
    pub fn allocate(&mut self) -> Handle {
        if let Some(handle) = self.free.pop() {
            return handle;
        }

        let handle = Handle::new(self.slots.len());
        self.slots.push(UNRESOLVED);
        handle
    }

    /// Looks up the real handle for `handle`.
    ///
    /// Returns `None` for [`Handle::NONE`], out-of-range handles and unresolved slots.
    #[inline]
    pub fn resolve(&self, handle: Handle) -> Option<Handle> {
        let raw = *self.slots.get(handle.index()?)?;
        (raw != UNRESOLVED).then(|| Handle::from_raw(raw))
    }

    /// Like [`resolve`](Self::resolve) but folds "unresolved" into [`Handle::NONE`].
    #[inline]
    pub fn remap(&self, handle: Handle) -> Handle {
        Handle::from_option(self.resolve(handle))
    }

    /// Records the outcome of a replayed creation.
    ///
    /// `real = None` (backend failure) leaves the slot unresolved for good. The table grows on
    /// demand: the replayer's copy only learns about new slots through the commands themselves.
    /// A handle realized again after its release leaves the free list.
    pub fn realize(&mut self, handle: Handle, real: Option<Handle>) {
        let Some(index) = handle.index() else { return };
        if index >= self.slots.len() {
            self.slots.resize(index + 1, UNRESOLVED);
        }
        self.slots[index] = real.map_or(UNRESOLVED, Handle::raw);
        self.free.retain(|&freed| freed != handle);
        self.changed = true;
    }

    /// Returns a handle whose removal has been replayed.
    ///
    /// The slot is reset to [`UNRESOLVED`] before the handle enters the free list. Releasing an
    /// unresolved handle is refused so a handle can never be queued twice.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(index) = handle.index() else { return false };
        match self.slots.get_mut(index) {
            Some(slot) if *slot != UNRESOLVED => {
                *slot = UNRESOLVED;
                self.free.push(handle);
                self.changed = true;
                true
            }
            _ => false,
        }
    }

    /// Copies this table's values and moves its freed handles into `dst`.
    ///
    /// No-op unless something changed since the previous relay. Slots `dst` knows about beyond
    /// this table's length (fresh recorder allocations) are left untouched.
    pub fn relay_into(&mut self, dst: &mut HandleTable) -> bool {
        if !self.changed {
            return false;
        }

        let n = self.slots.len();
        if dst.slots.len() < n {
            dst.slots.resize(n, UNRESOLVED);
        }
        dst.slots[..n].copy_from_slice(&self.slots);
        dst.free.append(&mut self.free);

        self.changed = false;
        dst.changed = true;
        true
    }

    /// Number of slots ever allocated.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handles currently waiting for reuse.
    #[inline]
    pub fn free_handles(&self) -> &[Handle] {
        &self.free
    }

    /// Raw remap values in handle order.
    #[inline]
    pub fn slots(&self) -> &[i32] {
        &self.slots
    }

    #[inline]
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn h(i: usize) -> Handle { Handle::new(i) }

    // ── allocation ────────────────────────────────────────────────────────

    #[test]
    fn allocates_dense_handles() {
        let mut t = HandleTable::new();
        assert_eq!(t.allocate(), h(0));
        assert_eq!(t.allocate(), h(1));
        assert_eq!(t.allocate(), h(2));
        assert_eq!(t.slots(), &[UNRESOLVED; 3]);
    }

    #[test]
    fn released_handle_is_reused_last_in_first_out() {
        let mut t = HandleTable::new();
        let a = t.allocate();
        let b = t.allocate();
        t.realize(a, Some(h(10)));
        t.realize(b, Some(h(11)));

        assert!(t.release(a));
        assert!(t.release(b));
        assert_eq!(t.resolve(a), None);

        assert_eq!(t.allocate(), b);
        assert_eq!(t.allocate(), a);
        assert_eq!(t.allocate(), h(2));
    }

    #[test]
    fn live_handles_stay_unique_across_churn() {
        let mut t = HandleTable::new();
        let mut live: Vec<Handle> = Vec::new();

        for step in 0..200usize {
            if step % 3 == 2 && !live.is_empty() {
                let victim = live.remove(step % live.len());
                assert!(t.release(victim));
            } else {
                let handle = t.allocate();
                t.realize(handle, Some(h(1000 + step)));
                live.push(handle);
            }

            let unique: HashSet<_> = live.iter().copied().collect();
            assert_eq!(unique.len(), live.len(), "duplicate live handle at step {step}");
            for freed in t.free_handles() {
                assert!(!unique.contains(freed), "{freed} is both live and free");
            }
        }
    }

    // ── resolution ────────────────────────────────────────────────────────

    #[test]
    fn resolve_out_of_range_is_none() {
        let t = HandleTable::new();
        assert_eq!(t.resolve(h(42)), None);
        assert_eq!(t.resolve(Handle::NONE), None);
        assert_eq!(t.remap(h(42)), Handle::NONE);
    }

    #[test]
    fn failed_creation_stays_unresolved() {
        let mut t = HandleTable::new();
        let a = t.allocate();
        t.realize(a, None);
        assert_eq!(t.resolve(a), None);
        assert!(t.is_changed());
    }

    #[test]
    fn realize_grows_on_demand() {
        let mut t = HandleTable::new();
        t.realize(h(5), Some(h(1)));
        assert_eq!(t.len(), 6);
        assert_eq!(t.resolve(h(5)), Some(h(1)));
        assert_eq!(t.resolve(h(4)), None);
    }

    #[test]
    fn release_refuses_unresolved() {
        let mut t = HandleTable::new();
        let a = t.allocate();
        assert!(!t.release(a));
        t.realize(a, Some(h(3)));
        assert!(t.release(a));
        assert!(!t.release(a), "double release must not queue twice");
        assert_eq!(t.free_handles(), &[a]);
    }

    #[test]
    fn realize_after_release_leaves_free_list() {
        let mut t = HandleTable::new();
        let a = t.allocate();
        t.realize(a, Some(h(100)));
        assert!(t.release(a));
        assert_eq!(t.free_handles(), &[a]);

        t.realize(a, Some(h(101)));
        assert_eq!(t.resolve(a), Some(h(101)));
        assert!(t.free_handles().is_empty(), "{a} is both live and free");
        assert_eq!(t.allocate(), h(1));
    }

    // ── relay ─────────────────────────────────────────────────────────────

    #[test]
    fn relay_moves_values_and_free_list() {
        let mut consumer = HandleTable::new();
        let mut producer = HandleTable::new();
        for _ in 0..4 {
            producer.allocate();
        }

        consumer.realize(h(0), Some(h(7)));
        consumer.realize(h(1), Some(h(8)));
        assert!(consumer.release(h(1)));

        assert!(consumer.relay_into(&mut producer));
        assert!(!consumer.is_changed());
        assert!(consumer.free_handles().is_empty());

        assert_eq!(producer.len(), 4);
        assert_eq!(producer.resolve(h(0)), Some(h(7)));
        assert_eq!(producer.resolve(h(1)), None);
        assert_eq!(producer.free_handles(), &[h(1)]);
        assert_eq!(producer.allocate(), h(1));
    }

    #[test]
    fn relay_without_changes_is_noop() {
        let mut a = HandleTable::new();
        let mut b = HandleTable::new();
        b.allocate();
        assert!(!a.relay_into(&mut b));
        assert!(!b.is_changed());
        assert_eq!(b.len(), 1);
    }
}
