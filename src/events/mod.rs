//! Events exchanged by application modules
//!
//! The set of events is closed: every event travelling through the bus is a variant of
//! [`Event`]. Listeners match on the variants they subscribed to, which lets the compiler check
//! that each subscribed event is handled.

pub mod button_event;
pub mod click_event;
pub mod led_event;
pub mod module_state_event;
pub mod power_event;
pub mod sensor_data_aggregator_event;
pub mod sensor_event;
pub mod tick_event;

use button_event::ButtonEvent;
use click_event::ClickEvent;
use led_event::{LedEvent, LedReadyEvent};
use module_state_event::ModuleStateEvent;
use power_event::{PowerDownEvent, WakeUpEvent};
use sensor_data_aggregator_event::{AggregatorEvent, AggregatorReleaseEvent};
use sensor_event::{SensorEvent, SensorStateEvent};
use tick_event::TickEvent;

/// System uptime in milliseconds
///
/// The value wraps around, so timestamps must be compared with wrapping arithmetic.
pub type Timestamp = u32;

/// Any event handled by the event bus
#[derive(Debug, Clone, PartialEq, defmt::Format)]
pub enum Event {
    /// Module reported its state
    ModuleState(ModuleStateEvent),
    /// Raw key press or release
    Button(ButtonEvent),
    /// Classified click of a key
    Click(ClickEvent),
    /// Request to play an effect on a LED
    Led(LedEvent),
    /// LED finished its effect
    LedReady(LedReadyEvent),
    /// New sample of a sensor
    Sensor(SensorEvent),
    /// Sensor changed its state
    SensorState(SensorStateEvent),
    /// Buffer of aggregated sensor samples handed to a consumer
    Aggregator(AggregatorEvent),
    /// Consumer returns an aggregated buffer
    AggregatorRelease(AggregatorReleaseEvent),
    /// System is going to a low power state
    PowerDown(PowerDownEvent),
    /// System wakes up from a low power state
    WakeUp(WakeUpEvent),
    /// Periodic timer tick
    Tick(TickEvent),
}

/// Tag identifying the variant of an [`Event`]
///
/// Listeners subscribe to event types. The tag is also used as an index in dispatch tables.
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
#[repr(u8)]
pub enum EventType {
    /// [`Event::ModuleState`]
    ModuleState,
    /// [`Event::Button`]
    Button,
    /// [`Event::Click`]
    Click,
    /// [`Event::Led`]
    Led,
    /// [`Event::LedReady`]
    LedReady,
    /// [`Event::Sensor`]
    Sensor,
    /// [`Event::SensorState`]
    SensorState,
    /// [`Event::Aggregator`]
    Aggregator,
    /// [`Event::AggregatorRelease`]
    AggregatorRelease,
    /// [`Event::PowerDown`]
    PowerDown,
    /// [`Event::WakeUp`]
    WakeUp,
    /// [`Event::Tick`]
    Tick,
}

impl EventType {
    /// Number of event types
    pub const COUNT: usize = 12;

    /// All event types in the order of their tags
    pub const ALL: [EventType; EventType::COUNT] = [
        EventType::ModuleState,
        EventType::Button,
        EventType::Click,
        EventType::Led,
        EventType::LedReady,
        EventType::Sensor,
        EventType::SensorState,
        EventType::Aggregator,
        EventType::AggregatorRelease,
        EventType::PowerDown,
        EventType::WakeUp,
        EventType::Tick,
    ];

    /// Index of this type in dispatch tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the event type used in logs
    pub const fn name(self) -> &'static str {
        match self {
            EventType::ModuleState => "module_state_event",
            EventType::Button => "button_event",
            EventType::Click => "click_event",
            EventType::Led => "led_event",
            EventType::LedReady => "led_ready_event",
            EventType::Sensor => "sensor_event",
            EventType::SensorState => "sensor_state_event",
            EventType::Aggregator => "sensor_data_aggregator_event",
            EventType::AggregatorRelease => "sensor_data_aggregator_release_buffer_event",
            EventType::PowerDown => "power_down_event",
            EventType::WakeUp => "wake_up_event",
            EventType::Tick => "tick_event",
        }
    }

    /// Tells if events of this type are logged right after the bus is created
    ///
    /// Frequent events are not logged by default, they would flood the log.
    pub const fn log_enabled_by_default(self) -> bool {
        !matches!(
            self,
            EventType::Sensor
                | EventType::Aggregator
                | EventType::AggregatorRelease
                | EventType::Tick
        )
    }
}

impl Event {
    /// Type tag of this event
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ModuleState(_) => EventType::ModuleState,
            Event::Button(_) => EventType::Button,
            Event::Click(_) => EventType::Click,
            Event::Led(_) => EventType::Led,
            Event::LedReady(_) => EventType::LedReady,
            Event::Sensor(_) => EventType::Sensor,
            Event::SensorState(_) => EventType::SensorState,
            Event::Aggregator(_) => EventType::Aggregator,
            Event::AggregatorRelease(_) => EventType::AggregatorRelease,
            Event::PowerDown(_) => EventType::PowerDown,
            Event::WakeUp(_) => EventType::WakeUp,
            Event::Tick(_) => EventType::Tick,
        }
    }

    /// Name of this event used in logs
    pub fn name(&self) -> &'static str {
        self.event_type().name()
    }
}

macro_rules! impl_from_payload {
    ($($payload:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$payload> for Event {
                fn from(payload: $payload) -> Self {
                    Event::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload! {
    ModuleStateEvent => ModuleState,
    ButtonEvent => Button,
    ClickEvent => Click,
    LedEvent => Led,
    LedReadyEvent => LedReady,
    SensorEvent => Sensor,
    SensorStateEvent => SensorState,
    AggregatorEvent => Aggregator,
    AggregatorReleaseEvent => AggregatorRelease,
    PowerDownEvent => PowerDown,
    WakeUpEvent => WakeUp,
    TickEvent => Tick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_indexes_match_order_of_all() {
        for (idx, event_type) in EventType::ALL.iter().enumerate() {
            assert_eq!(event_type.index(), idx);
        }
    }

    #[test]
    fn test_payload_converts_to_matching_variant() {
        let event: Event = ButtonEvent::new(3, true, 0).into();

        assert_eq!(event.event_type(), EventType::Button);
        assert_eq!(event.name(), "button_event");
    }

    #[test]
    fn test_frequent_events_are_not_logged_by_default() {
        assert!(EventType::Button.log_enabled_by_default());
        assert!(EventType::ModuleState.log_enabled_by_default());
        assert!(!EventType::Tick.log_enabled_by_default());
        assert!(!EventType::Sensor.log_enabled_by_default());
    }
}
