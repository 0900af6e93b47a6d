//! The pool keeps an array of slots, each big enough for any [`Event`] variant, and a flag per
//! slot telling if the slot is in use. Slots are claimed with an atomic compare-exchange, so
//! events can be allocated from interrupt handlers without a critical section.

use super::event_box::EventBox;
use crate::error::Error;
use crate::events::Event;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr;
use core::sync::atomic::{AtomicBool, Ordering};

/// Number of events which may exist at the same time in a single pool
pub const EVENT_POOL_SIZE: usize = 32;

/// Fixed size pool of events
pub struct EventPool {
    is_allocated: [AtomicBool; EVENT_POOL_SIZE],
    slots: [UnsafeCell<MaybeUninit<Event>>; EVENT_POOL_SIZE],
}

// Safety: a slot is accessed only by the owner of the matching `is_allocated` flag, claimed
// atomically in `alloc`
unsafe impl Sync for EventPool {}

impl EventPool {
    /// Creates a pool with all slots free
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_caf::evt_mem_mng::event_pool::EventPool;
    ///
    /// static POOL: EventPool = EventPool::new();
    /// assert_eq!(POOL.allocated(), 0);
    /// ```
    pub const fn new() -> Self {
        Self {
            // using magic number because of https://github.com/JoshMcguigan/arr_macro/issues/2
            is_allocated: arr_macro::arr![AtomicBool::new(false); 32],
            slots: arr_macro::arr![UnsafeCell::new(MaybeUninit::uninit()); 32],
        }
    }

    /// Moves `event` into a free slot
    ///
    /// Returns [`Error::NoMemory`] if all slots are in use.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_caf::events::button_event::ButtonEvent;
    /// use nrf_caf::events::Event;
    /// use nrf_caf::evt_mem_mng::event_pool::EventPool;
    ///
    /// let pool = EventPool::new();
    ///
    /// {
    ///     let event = pool.alloc(Event::Button(ButtonEvent::new(1, true, 0))).unwrap();
    ///     assert_eq!(pool.allocated(), 1);
    ///     // event is dropped when leaving this scope
    /// }
    ///
    /// assert_eq!(pool.allocated(), 0);
    /// ```
    pub fn alloc(&self, event: Event) -> Result<EventBox<'_>, Error> {
        for (idx, is_allocated) in self.is_allocated.iter().enumerate() {
            let was_allocated =
                is_allocated.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed);
            if was_allocated == Ok(false) {
                // Safety: guarded by the is_allocated flag acquired here
                unsafe { (*self.slots[idx].get()).write(event) };
                return Ok(EventBox::new(self, idx));
            }
        }

        Err(Error::NoMemory)
    }

    /// Number of slots in use
    pub fn allocated(&self) -> usize {
        self.is_allocated
            .iter()
            .filter(|is_allocated| is_allocated.load(Ordering::Relaxed))
            .count()
    }

    /// Recreates a box from the slot index returned by [`EventBox::into_raw`]
    ///
    /// # Safety
    ///
    /// `idx` must come from [`EventBox::into_raw`] called on a box of this pool, and it must be
    /// turned into a box only once.
    pub(crate) unsafe fn from_raw(&self, idx: usize) -> EventBox<'_> {
        debug_assert!(self.is_allocated[idx].load(Ordering::Relaxed));
        EventBox::new(self, idx)
    }

    /// Reference to the event in slot `idx`
    ///
    /// # Safety
    ///
    /// The slot must be allocated and owned by the caller.
    pub(super) unsafe fn slot(&self, idx: usize) -> &Event {
        (*self.slots[idx].get()).assume_init_ref()
    }

    /// Drops the event in slot `idx` and frees the slot
    ///
    /// Called when an [`EventBox`] is dropped.
    pub(super) fn release(&self, idx: usize) {
        // Safety: the slot is owned by the box being dropped and contains an initialized event
        unsafe { ptr::drop_in_place((*self.slots[idx].get()).as_mut_ptr()) };

        let was_allocated = self.is_allocated[idx].compare_exchange(
            true,
            false,
            Ordering::Release,
            Ordering::Relaxed,
        );
        assert!(was_allocated.is_ok());
    }
}

impl Default for EventPool {
    fn default() -> Self {
        Self::new()
    }
}
