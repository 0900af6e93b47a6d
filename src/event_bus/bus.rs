use super::listener::{Handled, Listener, SubscriptionLevel};
use super::queue::EventQueue;
use crate::error::Error;
use crate::events::{Event, EventType};
use defmt::{debug, info, trace};
use heapless::Vec;

/// Maximal number of listeners registered in an event bus
pub const MAX_LISTENERS: usize = 16;

/// Maximal number of subscribers of a single event type
pub const MAX_SUBSCRIBERS_PER_EVENT: usize = 8;

/// Handle of a registered listener
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct ListenerId(u8);

impl ListenerId {
    /// Position of the listener in registration order
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscriber {
    listener: ListenerId,
    level: SubscriptionLevel,
    exhaustive: bool,
}

type SubscriberList = Vec<Subscriber, MAX_SUBSCRIBERS_PER_EVENT>;

/// Collects listeners and their subscriptions at initialization
///
/// # Example
///
/// ```
/// use nrf_caf::event_bus::{EventBusBuilder, EventQueue};
/// use nrf_caf::events::button_event::ButtonEvent;
/// use nrf_caf::modules::click_detector::{ClickDetector, ClickDetectorConfig};
///
/// let queue = EventQueue::new();
/// let mut click_detector = ClickDetector::new(ClickDetectorConfig::default()).unwrap();
///
/// let mut builder = EventBusBuilder::new(&queue);
/// builder.register(&mut click_detector).unwrap();
/// let mut bus = builder.build();
///
/// queue.submit(ButtonEvent::new(0, true, 0));
/// assert_eq!(bus.process(), 1);
/// ```
pub struct EventBusBuilder<'a> {
    queue: &'a EventQueue,
    listeners: Vec<&'a mut dyn Listener, MAX_LISTENERS>,
    subscribers: [SubscriberList; EventType::COUNT],
}

impl<'a> EventBusBuilder<'a> {
    /// Creates a builder of a bus dispatching events from `queue`
    pub fn new(queue: &'a EventQueue) -> Self {
        Self {
            queue,
            listeners: Vec::new(),
            subscribers: core::array::from_fn(|_| Vec::new()),
        }
    }

    /// Registers `listener` with all its subscriptions
    ///
    /// Nothing is registered if any subscription is rejected.
    ///
    /// # Errors
    ///
    /// * [`Error::TooManyListeners`] if [`MAX_LISTENERS`] are already registered
    /// * [`Error::TooManySubscriptions`] if an event type has [`MAX_SUBSCRIBERS_PER_EVENT`]
    ///   subscribers
    /// * [`Error::DuplicateSubscription`] if the listener subscribes twice to an event type
    /// * [`Error::DuplicateFirstSubscriber`], [`Error::DuplicateFinalSubscriber`] if the event
    ///   type already has a subscriber at the unique level
    pub fn register(&mut self, listener: &'a mut dyn Listener) -> Result<ListenerId, Error> {
        if self.listeners.is_full() {
            return Err(Error::TooManyListeners);
        }
        let id = ListenerId(self.listeners.len() as u8);

        self.check_subscriptions(&*listener)?;

        for subscription in listener.subscriptions() {
            let list = &mut self.subscribers[subscription.event_type.index()];
            list.push(Subscriber {
                listener: id,
                level: subscription.level,
                exhaustive: subscription.exhaustive,
            })
            .map_err(|_| Error::TooManySubscriptions)?;

            // Keep the list sorted by level, registration order within a level
            let mut pos = list.len() - 1;
            while pos > 0 && list[pos - 1].level > list[pos].level {
                list.swap(pos - 1, pos);
                pos -= 1;
            }
        }

        debug!(
            "Registered listener {} with {} subscriptions",
            listener.name(),
            listener.subscriptions().len()
        );

        self.listeners
            .push(listener)
            .map_err(|_| Error::TooManyListeners)?;

        Ok(id)
    }

    fn check_subscriptions(&self, listener: &dyn Listener) -> Result<(), Error> {
        let subscriptions = listener.subscriptions();

        for (i, subscription) in subscriptions.iter().enumerate() {
            let event_type = subscription.event_type;
            let existing = &self.subscribers[event_type.index()];

            if subscriptions[..i].iter().any(|s| s.event_type == event_type) {
                return Err(Error::DuplicateSubscription);
            }

            let new_subscribers = subscriptions
                .iter()
                .filter(|s| s.event_type == event_type)
                .count();
            if existing.len() + new_subscribers > MAX_SUBSCRIBERS_PER_EVENT {
                return Err(Error::TooManySubscriptions);
            }

            let level_taken = |level| existing.iter().any(|s| s.level == level);
            match subscription.level {
                SubscriptionLevel::First if level_taken(SubscriptionLevel::First) => {
                    return Err(Error::DuplicateFirstSubscriber)
                }
                SubscriptionLevel::Final if level_taken(SubscriptionLevel::Final) => {
                    return Err(Error::DuplicateFinalSubscriber)
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Freezes the subscription table
    pub fn build(self) -> EventBus<'a> {
        let mut log_enabled = [false; EventType::COUNT];
        for event_type in EventType::ALL {
            log_enabled[event_type.index()] = event_type.log_enabled_by_default();
        }

        info!("Event bus ready with {} listeners", self.listeners.len());

        EventBus {
            queue: self.queue,
            listeners: self.listeners,
            subscribers: self.subscribers,
            log_enabled,
        }
    }
}

/// Dispatcher delivering queued events to subscribed listeners
///
/// The bus processes one event at a time. Every subscriber of the event type is called in
/// order until one of them consumes the event. Events submitted while an event is dispatched
/// wait at the tail of the queue.
pub struct EventBus<'a> {
    queue: &'a EventQueue,
    listeners: Vec<&'a mut dyn Listener, MAX_LISTENERS>,
    subscribers: [SubscriberList; EventType::COUNT],
    log_enabled: [bool; EventType::COUNT],
}

impl<'a> EventBus<'a> {
    /// Queue this bus dispatches events from
    pub fn queue(&self) -> &'a EventQueue {
        self.queue
    }

    /// Dispatches the oldest queued event
    ///
    /// Returns `false` if the queue was empty.
    ///
    /// # Panics
    ///
    /// Panics if a listener subscribed exhaustively does not recognize the event.
    pub fn dispatch_one(&mut self) -> bool {
        match self.queue.pop() {
            Some(event) => {
                self.dispatch(&event);
                true
            }
            None => false,
        }
    }

    /// Dispatches queued events until the queue is empty
    ///
    /// Returns the number of dispatched events, including events submitted by listeners during
    /// processing.
    pub fn process(&mut self) -> usize {
        let mut processed = 0;
        while self.dispatch_one() {
            processed += 1;
        }
        processed
    }

    /// Enables or disables logging of events of `event_type`
    pub fn set_logging(&mut self, event_type: EventType, enabled: bool) {
        self.log_enabled[event_type.index()] = enabled;
    }

    /// Checks if events of `event_type` are logged when dispatched
    pub fn is_logging_enabled(&self, event_type: EventType) -> bool {
        self.log_enabled[event_type.index()]
    }

    /// Listener registered as `id`
    ///
    /// Returns `None` if `id` is unknown, the listener is not an `L` or it does not expose itself
    /// with [`Listener::as_any`].
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::event_bus::{EventBusBuilder, EventQueue};
    /// use nrf_caf::events::module_state_event::{ModuleId, ModuleState};
    /// use nrf_caf::modules::module_state::ModuleStateTracker;
    ///
    /// const BUTTONS: ModuleId = ModuleId(1);
    ///
    /// let queue = EventQueue::new();
    /// let mut tracker = ModuleStateTracker::new();
    /// tracker.register(BUTTONS, "buttons").unwrap();
    ///
    /// let mut builder = EventBusBuilder::new(&queue);
    /// let tracker_id = builder.register(&mut tracker).unwrap();
    /// let mut bus = builder.build();
    ///
    /// bus.listener_mut::<ModuleStateTracker>(tracker_id)
    ///     .unwrap()
    ///     .set_state(BUTTONS, ModuleState::Ready, &queue)
    ///     .unwrap();
    /// bus.process();
    ///
    /// let tracker = bus.listener::<ModuleStateTracker>(tracker_id).unwrap();
    /// assert!(tracker.all_ready(&[BUTTONS]));
    /// ```
    pub fn listener<L: Listener + 'static>(&self, id: ListenerId) -> Option<&L> {
        self.listeners
            .get(id.index())?
            .as_any()?
            .downcast_ref::<L>()
    }

    /// Mutable counterpart of [`listener`](EventBus::listener)
    pub fn listener_mut<L: Listener + 'static>(&mut self, id: ListenerId) -> Option<&mut L> {
        self.listeners
            .get_mut(id.index())?
            .as_any_mut()?
            .downcast_mut::<L>()
    }

    /// Number of listeners subscribed to `event_type`
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers[event_type.index()].len()
    }

    fn dispatch(&mut self, event: &Event) {
        let event_type = event.event_type();

        if self.log_enabled[event_type.index()] {
            info!("{}: {}", event_type.name(), event);
        }

        for subscriber in self.subscribers[event_type.index()].iter() {
            let listener = &mut self.listeners[subscriber.listener.index()];

            match listener.handle(event, self.queue) {
                Handled::Consumed => {
                    trace!("{} consumed by {}", event_type.name(), listener.name());
                    return;
                }
                Handled::Continue => {}
                Handled::Unrecognized if subscriber.exhaustive => {
                    panic!(
                        "{} did not recognize {}",
                        listener.name(),
                        event_type.name()
                    );
                }
                Handled::Unrecognized => {}
            }
        }
    }
}
