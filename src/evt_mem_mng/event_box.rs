use super::event_pool::EventPool;
use crate::events::Event;
use core::fmt::{Debug, Formatter};
use core::mem;
use core::ops::Deref;

/// Event stored in an [`EventPool`] slot
///
/// [`EventBox`] is a smart pointer dereferencing the stored [`Event`]. The slot is returned to the
/// pool when the box is dropped. Events are immutable once boxed.
pub struct EventBox<'pool> {
    pool: &'pool EventPool,
    idx: usize,
}

impl<'pool> EventBox<'pool> {
    /// Creates a box for the slot `idx` of `pool`
    ///
    /// The caller must own the slot and the slot must contain an initialized event.
    pub(super) fn new(pool: &'pool EventPool, idx: usize) -> Self {
        Self { pool, idx }
    }

    /// Converts the box into the index of its slot without releasing the slot
    ///
    /// The slot stays allocated until it is turned into a box again with
    /// [`EventPool::from_raw`] and that box is dropped.
    pub(crate) fn into_raw(self) -> usize {
        let idx = self.idx;
        mem::forget(self);
        idx
    }
}

impl Deref for EventBox<'_> {
    type Target = Event;

    fn deref(&self) -> &Self::Target {
        // Safety: the slot is owned by this box and initialized by the pool
        unsafe { self.pool.slot(self.idx) }
    }
}

impl Debug for EventBox<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        f.debug_struct("EventBox")
            .field("slot", &self.idx)
            .field("event", self.deref())
            .finish()
    }
}

impl Drop for EventBox<'_> {
    fn drop(&mut self) {
        self.pool.release(self.idx);
    }
}
