use crate::crit_sect;
use crate::events::Event;
use crate::evt_mem_mng::event_box::EventBox;
use crate::evt_mem_mng::event_pool::{EventPool, EVENT_POOL_SIZE};
use crate::mutex::Mutex;
use heapless::Deque;

/// Maximal number of events waiting for dispatch
///
/// Every queued event occupies a pool slot, so the queue never fills up before the pool does.
pub const EVENT_QUEUE_SIZE: usize = EVENT_POOL_SIZE;

/// Queue of events submitted for dispatch
///
/// The queue is the only part of the event bus shared between execution contexts. Events can be
/// submitted from interrupt handlers, from other threads and from listeners while the dispatcher
/// processes the queue. Events submitted from one context are dispatched in submission order.
///
/// # Examples
///
/// ```
/// use nrf_caf::event_bus::EventQueue;
/// use nrf_caf::events::button_event::ButtonEvent;
///
/// static EVENT_QUEUE: EventQueue = EventQueue::new();
///
/// // Called from the GPIOTE interrupt handler
/// EVENT_QUEUE.submit(ButtonEvent::new(3, true, 1200));
///
/// assert_eq!(EVENT_QUEUE.len(), 1);
/// ```
pub struct EventQueue {
    pool: EventPool,
    pending: Mutex<Deque<usize, EVENT_QUEUE_SIZE>>,
}

impl EventQueue {
    /// Creates an empty queue
    pub const fn new() -> Self {
        Self {
            pool: EventPool::new(),
            pending: Mutex::new(Deque::new()),
        }
    }

    /// Submits an event for dispatch
    ///
    /// The event is moved into the event pool. It is owned by the event bus until all listeners
    /// processed it.
    ///
    /// # Panics
    ///
    /// Running out of event memory is not recoverable: the application would lose events it
    /// depends on. This function panics if the event pool is exhausted.
    pub fn submit<E: Into<Event>>(&self, event: E) {
        let event = event.into();
        let event_type = event.event_type();

        let idx = match self.pool.alloc(event) {
            Ok(event_box) => event_box.into_raw(),
            Err(_) => panic!(
                "Out of event memory, cannot submit {}",
                event_type.name()
            ),
        };

        crit_sect::locked(|cs| {
            if self.pending.borrow_mut(cs).push_back(idx).is_err() {
                panic!("Event queue overflow, cannot submit {}", event_type.name());
            }
        });
    }

    /// Removes the oldest event from the queue
    pub(crate) fn pop(&self) -> Option<EventBox<'_>> {
        let idx = crit_sect::locked(|cs| self.pending.borrow_mut(cs).pop_front())?;
        // Safety: indexes in the queue come from `into_raw` in `submit` and are popped once
        Some(unsafe { self.pool.from_raw(idx) })
    }

    /// Number of events waiting for dispatch
    pub fn len(&self) -> usize {
        crit_sect::locked(|cs| self.pending.borrow(cs).len())
    }

    /// Checks if no event waits for dispatch
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events allocated in the event pool, including the one being dispatched
    pub fn allocated(&self) -> usize {
        self.pool.allocated()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}
