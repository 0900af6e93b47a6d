//! Tracks the life-cycle state of application modules
//!
//! Modules report state changes through [`ModuleStateTracker::set_state`], which records the new
//! state and broadcasts it as a [`ModuleStateEvent`]. Registered as a listener, the tracker also
//! records states reported by modules which submit [`ModuleStateEvent`]s on their own.
//!
//! The tracker does not validate transitions and does not retry anything: a module which never
//! reports [`ModuleState::Ready`] stalls the modules waiting for it.

use core::any::Any;
use crate::error::Error;
use crate::event_bus::{EventQueue, Handled, Listener, Subscription};
use crate::events::module_state_event::{ModuleId, ModuleState, ModuleStateEvent};
use crate::events::{Event, EventType};
use defmt::{debug, info, warn};
use heapless::Vec;

/// Maximal number of modules tracked by a [`ModuleStateTracker`]
pub const MAX_MODULES: usize = 16;

const SUBSCRIPTIONS: &[Subscription] = &[Subscription::new(EventType::ModuleState).first()];

#[derive(Debug)]
struct TrackedModule {
    id: ModuleId,
    name: &'static str,
    state: ModuleState,
}

/// Registry of module states
#[derive(Debug, Default)]
pub struct ModuleStateTracker {
    modules: Vec<TrackedModule, MAX_MODULES>,
}

impl ModuleStateTracker {
    /// Creates a tracker without any module
    pub const fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Starts tracking the module `module_id`
    ///
    /// The module is [`ModuleState::Off`] until it reports another state.
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateModule`] if `module_id` is already registered
    /// * [`Error::TooManyModules`] if [`MAX_MODULES`] modules are already registered
    pub fn register(&mut self, module_id: ModuleId, name: &'static str) -> Result<(), Error> {
        if self.find(module_id).is_some() {
            return Err(Error::DuplicateModule);
        }

        self.modules
            .push(TrackedModule {
                id: module_id,
                name,
                state: ModuleState::Off,
            })
            .map_err(|_| Error::TooManyModules)
    }

    /// Records `state` of `module_id` and broadcasts it
    ///
    /// Every call submits an event, even if the state did not change.
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::event_bus::EventQueue;
    /// use nrf_caf::events::module_state_event::{ModuleId, ModuleState};
    /// use nrf_caf::modules::module_state::ModuleStateTracker;
    ///
    /// const SETTINGS_LOADER: ModuleId = ModuleId(1);
    ///
    /// let queue = EventQueue::new();
    /// let mut tracker = ModuleStateTracker::new();
    /// tracker.register(SETTINGS_LOADER, "settings_loader").unwrap();
    ///
    /// tracker.set_state(SETTINGS_LOADER, ModuleState::Ready, &queue).unwrap();
    ///
    /// assert_eq!(tracker.get_state(SETTINGS_LOADER), ModuleState::Ready);
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn set_state(
        &mut self,
        module_id: ModuleId,
        state: ModuleState,
        queue: &EventQueue,
    ) -> Result<(), Error> {
        let module = self.find_mut(module_id).ok_or(Error::UnknownModule)?;

        module.state = state;
        info!("Module {} state: {}", module.name, state);

        queue.submit(ModuleStateEvent::new(module_id, state));
        Ok(())
    }

    /// Last recorded state of `module_id`
    ///
    /// Modules which never reported their state, including modules which are not registered,
    /// are [`ModuleState::Off`].
    pub fn get_state(&self, module_id: ModuleId) -> ModuleState {
        self.find(module_id)
            .map_or(ModuleState::Off, |module| module.state)
    }

    /// Checks if all `module_ids` reported [`ModuleState::Ready`]
    pub fn all_ready(&self, module_ids: &[ModuleId]) -> bool {
        module_ids
            .iter()
            .all(|id| self.get_state(*id) == ModuleState::Ready)
    }

    /// Name given to `module_id` at registration
    pub fn name(&self, module_id: ModuleId) -> Option<&'static str> {
        self.find(module_id).map(|module| module.name)
    }

    fn find(&self, module_id: ModuleId) -> Option<&TrackedModule> {
        self.modules.iter().find(|module| module.id == module_id)
    }

    fn find_mut(&mut self, module_id: ModuleId) -> Option<&mut TrackedModule> {
        self.modules.iter_mut().find(|module| module.id == module_id)
    }

    fn on_module_state_event(&mut self, event: &ModuleStateEvent) {
        match self.find_mut(event.module_id) {
            Some(module) => {
                if module.state != event.state {
                    debug!("Module {} reported {}", module.name, event.state);
                }
                module.state = event.state;
            }
            None => warn!("State {} of untracked module {}", event.state, event.module_id),
        }
    }
}

impl Listener for ModuleStateTracker {
    fn name(&self) -> &'static str {
        "module_state"
    }

    fn subscriptions(&self) -> &[Subscription] {
        SUBSCRIPTIONS
    }

    fn handle(&mut self, event: &Event, _queue: &EventQueue) -> Handled {
        match event {
            Event::ModuleState(event) => {
                self.on_module_state_event(event);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBusBuilder;

    const BUTTONS: ModuleId = ModuleId(1);
    const LEDS: ModuleId = ModuleId(2);

    fn tracker_with_modules() -> ModuleStateTracker {
        let mut tracker = ModuleStateTracker::new();
        tracker.register(BUTTONS, "buttons").unwrap();
        tracker.register(LEDS, "leds").unwrap();
        tracker
    }

    #[test]
    fn test_registered_module_is_off() {
        let tracker = tracker_with_modules();

        assert_eq!(tracker.get_state(BUTTONS), ModuleState::Off);
        assert_eq!(tracker.name(BUTTONS), Some("buttons"));
    }

    #[test]
    fn test_unknown_module_is_off() {
        let tracker = tracker_with_modules();

        assert_eq!(tracker.get_state(ModuleId(77)), ModuleState::Off);
        assert_eq!(tracker.name(ModuleId(77)), None);
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut tracker = tracker_with_modules();

        assert_eq!(tracker.register(BUTTONS, "buttons_again"), Err(Error::DuplicateModule));
    }

    #[test]
    fn test_too_many_modules_rejected() {
        let mut tracker = ModuleStateTracker::new();
        for id in 0..MAX_MODULES {
            tracker.register(ModuleId(id as u8), "module").unwrap();
        }

        assert_eq!(
            tracker.register(ModuleId(MAX_MODULES as u8), "module"),
            Err(Error::TooManyModules)
        );
    }

    #[test]
    fn test_set_state_of_unknown_module_fails() {
        let queue = EventQueue::new();
        let mut tracker = tracker_with_modules();

        let result = tracker.set_state(ModuleId(9), ModuleState::Ready, &queue);

        assert_eq!(result, Err(Error::UnknownModule));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_set_state_twice_emits_two_events_and_keeps_state() {
        let queue = EventQueue::new();
        let mut tracker = tracker_with_modules();

        tracker.set_state(BUTTONS, ModuleState::Ready, &queue).unwrap();
        tracker.set_state(BUTTONS, ModuleState::Ready, &queue).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(tracker.get_state(BUTTONS), ModuleState::Ready);
    }

    #[test]
    fn test_error_state_is_recorded() {
        let queue = EventQueue::new();
        let mut tracker = tracker_with_modules();

        tracker.set_state(LEDS, ModuleState::Ready, &queue).unwrap();
        tracker.set_state(LEDS, ModuleState::Error, &queue).unwrap();

        assert_eq!(tracker.get_state(LEDS), ModuleState::Error);
        assert_eq!(tracker.get_state(BUTTONS), ModuleState::Off);
    }

    #[test]
    fn test_all_ready() {
        let queue = EventQueue::new();
        let mut tracker = tracker_with_modules();

        tracker.set_state(BUTTONS, ModuleState::Ready, &queue).unwrap();
        assert!(tracker.all_ready(&[BUTTONS]));
        assert!(!tracker.all_ready(&[BUTTONS, LEDS]));

        tracker.set_state(LEDS, ModuleState::Ready, &queue).unwrap();
        assert!(tracker.all_ready(&[BUTTONS, LEDS]));
        assert!(tracker.all_ready(&[]));
    }

    #[test]
    fn test_states_reported_by_events_are_recorded() {
        let queue = EventQueue::new();
        let mut tracker = tracker_with_modules();

        {
            let mut builder = EventBusBuilder::new(&queue);
            builder.register(&mut tracker).unwrap();
            let mut bus = builder.build();

            queue.submit(ModuleStateEvent::new(LEDS, ModuleState::Standby));
            queue.submit(ModuleStateEvent::new(ModuleId(40), ModuleState::Ready));
            assert_eq!(bus.process(), 2);
        }

        assert_eq!(tracker.get_state(LEDS), ModuleState::Standby);
        assert_eq!(tracker.get_state(ModuleId(40)), ModuleState::Off);
    }
}
