//! Publish/subscribe event bus
//!
//! Producers submit events to an [`EventQueue`]. The queue is `Sync`, so it can live in a
//! `static` and be used from interrupt handlers. A single [`EventBus`] owned by the main loop
//! takes events from the queue and calls the [`Listener`]s subscribed to the event type.
//!
//! ```
//! use nrf_caf::event_bus::{EventBusBuilder, EventQueue};
//! use nrf_caf::events::module_state_event::{ModuleId, ModuleState};
//! use nrf_caf::modules::module_state::ModuleStateTracker;
//!
//! static EVENT_QUEUE: EventQueue = EventQueue::new();
//!
//! let mut tracker = ModuleStateTracker::new();
//! tracker.register(ModuleId(1), "buttons").unwrap();
//!
//! let mut builder = EventBusBuilder::new(&EVENT_QUEUE);
//! builder.register(&mut tracker).unwrap();
//! let mut bus = builder.build();
//!
//! // Main loop
//! while bus.dispatch_one() {}
//! ```

mod bus;
mod listener;
mod queue;

pub use bus::{EventBus, EventBusBuilder, ListenerId, MAX_LISTENERS, MAX_SUBSCRIBERS_PER_EVENT};
pub use listener::{Handled, Listener, Subscription, SubscriptionLevel};
pub use queue::{EventQueue, EVENT_QUEUE_SIZE};
