//! Mutex guarding data reachable from interrupt handlers submitting events.
//!
//! Access requires the [`CriticalSection`] token obtained from
//! [`crit_sect::locked`](crate::crit_sect::locked).

use crate::crit_sect::CriticalSection;
use core::cell::{Ref, RefCell, RefMut};

/// Wraps data shared between interrupt handlers and the event dispatcher
pub struct Mutex<T>(RefCell<T>);

impl<T> Mutex<T> {
    /// Wraps `value`
    ///
    /// The constructor is `const`, so the mutex can be placed in a `static`.
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::mutex::Mutex;
    ///
    /// static PENDING_PRESSES: Mutex<u32> = Mutex::new(0);
    /// ```
    pub const fn new(value: T) -> Mutex<T> {
        Self(RefCell::new(value))
    }

    /// Borrows the wrapped data for reading
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::crit_sect;
    /// use nrf_caf::mutex::Mutex;
    ///
    /// static LAST_KEY: Mutex<u16> = Mutex::new(3);
    ///
    /// crit_sect::locked(|cs| {
    ///   assert_eq!(*LAST_KEY.borrow(cs), 3);
    /// });
    /// ```
    pub fn borrow<'cs>(&'cs self, _cs: &'cs CriticalSection) -> Ref<'cs, T> {
        self.0.borrow()
    }

    /// Borrows the wrapped data for writing
    pub fn borrow_mut<'cs>(&'cs self, _cs: &'cs CriticalSection) -> RefMut<'cs, T> {
        self.0.borrow_mut()
    }
}

// Safety: the critical section token prevents concurrent access from thread mode and interrupt
// handlers. The RefCell catches overlapping borrows from the same context at run time.
unsafe impl<T> Sync for Mutex<T> where T: Send {}
