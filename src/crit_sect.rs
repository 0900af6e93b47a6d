//! Critical sections protecting data shared by interrupt handlers and the event dispatcher
//!
//! Events may be submitted from interrupt handlers (buttons, timers, sensor drivers) while the
//! dispatcher runs in thread mode. Data touched by both contexts is accessed only inside
//! [`locked`], which proves the exclusive access with a [`CriticalSection`] token.
//!
//! On the nRF52840 a critical section disables all interrupts. On the mocked platform it holds a
//! global reentrant lock, so threads standing in for interrupt handlers are serialized too.

// TODO: Mask only the interrupts which submit events instead of disabling all of them

/// Token proving that the code runs inside a critical section
pub struct CriticalSection<'a> {
    _internal_cs: critical_section::CriticalSection<'a>,
}

impl<'a> CriticalSection<'a> {
    fn new(internal_cs: critical_section::CriticalSection<'a>) -> Self {
        Self {
            _internal_cs: internal_cs,
        }
    }
}

/// Runs `f` inside a critical section
///
/// Critical sections can be nested.
///
/// # Example
///
/// ```
/// use nrf_caf::crit_sect;
///
/// let answer = crit_sect::locked(|_cs| 42);
/// assert_eq!(answer, 42);
/// ```
pub fn locked<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    critical_section::with(|cs| f(&CriticalSection::new(cs)))
}
