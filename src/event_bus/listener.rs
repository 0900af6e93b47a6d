use super::queue::EventQueue;
use crate::events::{Event, EventType};
use core::any::Any;

/// Position of a subscriber in the dispatch order of an event type
///
/// Subscribers are called level by level. Within a level they are called in registration order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, defmt::Format)]
pub enum SubscriptionLevel {
    /// Called before all other subscribers. Only one per event type.
    First,
    /// Called before normal subscribers
    Early,
    /// Default level
    Normal,
    /// Called after all other subscribers. Only one per event type.
    Final,
}

/// Subscription of a listener to an event type
///
/// # Example
///
/// ```
/// use nrf_caf::event_bus::{Subscription, SubscriptionLevel};
/// use nrf_caf::events::EventType;
///
/// const SUBSCRIPTIONS: &[Subscription] = &[
///     Subscription::new(EventType::Button).early(),
///     Subscription::new(EventType::ModuleState).exhaustive(),
/// ];
///
/// assert_eq!(SUBSCRIPTIONS[0].level, SubscriptionLevel::Early);
/// assert!(SUBSCRIPTIONS[1].exhaustive);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct Subscription {
    /// Type of events delivered to the listener
    pub event_type: EventType,
    /// Position in the dispatch order
    pub level: SubscriptionLevel,
    /// The listener must recognize every delivered event
    ///
    /// An exhaustive listener returning [`Handled::Unrecognized`] is a logic error, and the
    /// dispatcher panics.
    pub exhaustive: bool,
}

impl Subscription {
    /// Non-exhaustive subscription at [`SubscriptionLevel::Normal`]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            level: SubscriptionLevel::Normal,
            exhaustive: false,
        }
    }

    /// Moves the subscription to `level`
    pub const fn with_level(self, level: SubscriptionLevel) -> Self {
        Self { level, ..self }
    }

    /// Moves the subscription to [`SubscriptionLevel::First`]
    pub const fn first(self) -> Self {
        self.with_level(SubscriptionLevel::First)
    }

    /// Moves the subscription to [`SubscriptionLevel::Early`]
    pub const fn early(self) -> Self {
        self.with_level(SubscriptionLevel::Early)
    }

    /// Moves the subscription to [`SubscriptionLevel::Final`]
    pub const fn final_level(self) -> Self {
        self.with_level(SubscriptionLevel::Final)
    }

    /// Marks the subscription exhaustive
    pub const fn exhaustive(self) -> Self {
        Self {
            exhaustive: true,
            ..self
        }
    }
}

/// Result of delivering an event to a listener
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub enum Handled {
    /// Event is processed, it is not delivered to the following subscribers
    Consumed,
    /// Event is delivered to the following subscribers
    Continue,
    /// Listener did not expect this event
    Unrecognized,
}

/// Module receiving events from the event bus
pub trait Listener {
    /// Name of the listener used in logs
    fn name(&self) -> &'static str;

    /// Event types delivered to this listener
    ///
    /// Read once, when the listener is registered.
    fn subscriptions(&self) -> &[Subscription];

    /// Processes `event`
    ///
    /// Events submitted to `queue` are dispatched after all subscribers of the current event
    /// were called.
    fn handle(&mut self, event: &Event, queue: &EventQueue) -> Handled;

    /// The listener as [`Any`], letting [`EventBus::listener`](super::EventBus::listener) reach
    /// it after registration
    ///
    /// Listeners returning `None` are reachable only through events.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Mutable counterpart of [`as_any`](Listener::as_any)
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}
