//! Classifies raw key presses into clicks
//!
//! The detector measures how long a configured key was held:
//!
//! * released before `short_click_max_ms`: [`Click::Short`], or [`Click::Double`] when the
//!   previous short click of the same key ended at most `double_click_max_ms` earlier
//! * released after at least `long_click_min_ms`: [`Click::Long`]
//! * anything in between is not a click
//!
//! Keys configured with `consume_button_event` do not reach listeners subscribed after the
//! detector. Button events of other keys pass through untouched.

use core::any::Any;
use crate::error::Error;
use crate::event_bus::{EventQueue, Handled, Listener, Subscription};
use crate::events::button_event::ButtonEvent;
use crate::events::click_event::{Click, ClickEvent};
use crate::events::module_state_event::{ModuleId, ModuleState, ModuleStateEvent};
use crate::events::{Event, EventType, Timestamp};
use defmt::{debug, info, trace};
use heapless::Vec;

/// Maximal number of keys handled by a [`ClickDetector`]
pub const CLICK_DETECTOR_MAX_KEYS: usize = 8;

/// Identifier the click detector reports its state with, unless configured otherwise
pub const CLICK_DETECTOR_MODULE_ID: ModuleId = ModuleId(0xc0);

const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription::new(EventType::Button).early(),
    Subscription::new(EventType::ModuleState),
    Subscription::new(EventType::PowerDown),
    Subscription::new(EventType::WakeUp),
];

/// Key handled by the click detector
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct ClickKeyConfig {
    /// Identifier of the key
    pub key_id: u16,
    /// Raw button events of this key are not passed to following listeners
    pub consume_button_event: bool,
}

/// Configuration of a [`ClickDetector`]
///
/// # Example
///
/// ```
/// use nrf_caf::events::module_state_event::ModuleId;
/// use nrf_caf::modules::click_detector::ClickDetectorConfig;
///
/// let config = ClickDetectorConfig::default()
///     .with_key(3, true)
///     .unwrap()
///     .with_thresholds(300, 3000)
///     .with_gate(ModuleId(1));
///
/// assert_eq!(config.keys.len(), 1);
/// assert_eq!(config.short_click_max_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClickDetectorConfig {
    /// Identifier the detector reports its state with
    pub module_id: ModuleId,
    /// Module which must be ready before the detector starts
    pub gate: Option<ModuleId>,
    /// Handled keys
    pub keys: Vec<ClickKeyConfig, CLICK_DETECTOR_MAX_KEYS>,
    /// Presses shorter than this are short clicks
    pub short_click_max_ms: u32,
    /// Presses at least this long are long clicks
    pub long_click_min_ms: u32,
    /// Maximal time between two short clicks making a double click
    pub double_click_max_ms: u32,
}

impl Default for ClickDetectorConfig {
    fn default() -> Self {
        Self {
            module_id: CLICK_DETECTOR_MODULE_ID,
            gate: None,
            keys: Vec::new(),
            short_click_max_ms: 500,
            long_click_min_ms: 5000,
            double_click_max_ms: 500,
        }
    }
}

impl ClickDetectorConfig {
    /// Adds a handled key
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateKey`] if `key_id` is already configured
    /// * [`Error::TooManyKeys`] if [`CLICK_DETECTOR_MAX_KEYS`] keys are already configured
    pub fn with_key(mut self, key_id: u16, consume_button_event: bool) -> Result<Self, Error> {
        if self.keys.iter().any(|key| key.key_id == key_id) {
            return Err(Error::DuplicateKey);
        }

        self.keys
            .push(ClickKeyConfig {
                key_id,
                consume_button_event,
            })
            .map_err(|_| Error::TooManyKeys)?;
        Ok(self)
    }

    /// Sets the short and long click thresholds
    pub fn with_thresholds(mut self, short_click_max_ms: u32, long_click_min_ms: u32) -> Self {
        self.short_click_max_ms = short_click_max_ms;
        self.long_click_min_ms = long_click_min_ms;
        self
    }

    /// Sets the maximal time between short clicks making a double click
    pub fn with_double_click_window(mut self, double_click_max_ms: u32) -> Self {
        self.double_click_max_ms = double_click_max_ms;
        self
    }

    /// Keeps the detector inactive until `gate` reports [`ModuleState::Ready`]
    pub fn with_gate(mut self, gate: ModuleId) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Sets the identifier the detector reports its state with
    pub fn with_module_id(mut self, module_id: ModuleId) -> Self {
        self.module_id = module_id;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyState {
    pressed: bool,
    press_timestamp: Timestamp,
    last_short_click: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
enum DetectorState {
    WaitingForGate,
    Active,
    Suspended,
}

/// Listener turning button events into click events
pub struct ClickDetector {
    config: ClickDetectorConfig,
    keys: Vec<KeyState, CLICK_DETECTOR_MAX_KEYS>,
    state: DetectorState,
}

impl ClickDetector {
    /// Creates a detector
    ///
    /// A detector without a gate is active right away. Otherwise it waits for the gate module to
    /// report [`ModuleState::Ready`].
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidThresholds`] if `short_click_max_ms` is zero or above
    ///   `long_click_min_ms`
    /// * [`Error::DuplicateKey`] if a key is configured twice
    pub fn new(config: ClickDetectorConfig) -> Result<Self, Error> {
        if config.short_click_max_ms == 0 || config.short_click_max_ms > config.long_click_min_ms
        {
            return Err(Error::InvalidThresholds);
        }

        let mut keys = Vec::new();
        for (i, key) in config.keys.iter().enumerate() {
            if config.keys[..i].iter().any(|k| k.key_id == key.key_id) {
                return Err(Error::DuplicateKey);
            }
            keys.push(KeyState::default())
                .map_err(|_| Error::TooManyKeys)?;
        }

        let state = match config.gate {
            Some(_) => DetectorState::WaitingForGate,
            None => DetectorState::Active,
        };

        Ok(Self {
            config,
            keys,
            state,
        })
    }

    /// Checks if the detector classifies button events
    pub fn is_active(&self) -> bool {
        self.state == DetectorState::Active
    }

    /// Processes a raw button event
    ///
    /// Submits a [`ClickEvent`] to `queue` when a release completes a click. Returns
    /// [`Handled::Consumed`] for keys configured with `consume_button_event`.
    pub fn on_button_event(&mut self, event: &ButtonEvent, queue: &EventQueue) -> Handled {
        if self.state != DetectorState::Active {
            return Handled::Continue;
        }

        let Some(idx) = self
            .config
            .keys
            .iter()
            .position(|key| key.key_id == event.key_id)
        else {
            return Handled::Continue;
        };

        let key_state = &mut self.keys[idx];
        if event.pressed {
            key_state.pressed = true;
            key_state.press_timestamp = event.timestamp_ms;
        } else if key_state.pressed {
            key_state.pressed = false;
            let click = Self::classify(&self.config, key_state, event.timestamp_ms);

            if let Some(click) = click {
                debug!("Key {} click {}", event.key_id, click);
                queue.submit(ClickEvent {
                    key_id: event.key_id,
                    click,
                });
            }
        } else {
            trace!("Release of key {} without press", event.key_id);
        }

        if self.config.keys[idx].consume_button_event {
            Handled::Consumed
        } else {
            Handled::Continue
        }
    }

    fn classify(
        config: &ClickDetectorConfig,
        key_state: &mut KeyState,
        release_timestamp: Timestamp,
    ) -> Option<Click> {
        let press_duration = release_timestamp.wrapping_sub(key_state.press_timestamp);

        if press_duration < config.short_click_max_ms {
            let is_double = key_state.last_short_click.map_or(false, |last| {
                release_timestamp.wrapping_sub(last) <= config.double_click_max_ms
            });

            if is_double {
                key_state.last_short_click = None;
                Some(Click::Double)
            } else {
                key_state.last_short_click = Some(release_timestamp);
                Some(Click::Short)
            }
        } else if press_duration >= config.long_click_min_ms {
            key_state.last_short_click = None;
            Some(Click::Long)
        } else {
            key_state.last_short_click = None;
            None
        }
    }

    fn reset_keys(&mut self) {
        for key_state in self.keys.iter_mut() {
            *key_state = KeyState::default();
        }
    }

    fn on_module_state_event(&mut self, event: &ModuleStateEvent, queue: &EventQueue) {
        let Some(gate) = self.config.gate else {
            return;
        };

        if self.state == DetectorState::WaitingForGate && event.check(gate, ModuleState::Ready) {
            self.state = DetectorState::Active;
            info!("Click detector active");
            queue.submit(ModuleStateEvent::new(self.config.module_id, ModuleState::Ready));
        }
    }

    fn on_power_down(&mut self, queue: &EventQueue) {
        if self.state == DetectorState::Active {
            self.reset_keys();
            self.state = DetectorState::Suspended;
            queue.submit(ModuleStateEvent::new(
                self.config.module_id,
                ModuleState::Standby,
            ));
        }
    }

    fn on_wake_up(&mut self, queue: &EventQueue) {
        if self.state == DetectorState::Suspended {
            self.state = DetectorState::Active;
            queue.submit(ModuleStateEvent::new(self.config.module_id, ModuleState::Ready));
        }
    }
}

impl Listener for ClickDetector {
    fn name(&self) -> &'static str {
        "click_detector"
    }

    fn subscriptions(&self) -> &[Subscription] {
        SUBSCRIPTIONS
    }

    fn handle(&mut self, event: &Event, queue: &EventQueue) -> Handled {
        match event {
            Event::Button(event) => self.on_button_event(event, queue),
            Event::ModuleState(event) => {
                self.on_module_state_event(event, queue);
                Handled::Continue
            }
            Event::PowerDown(_) => {
                self.on_power_down(queue);
                Handled::Continue
            }
            Event::WakeUp(_) => {
                self.on_wake_up(queue);
                Handled::Continue
            }
            _ => Handled::Unrecognized,
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}
