//! Module life-cycle reports
//!
//! Modules broadcast their state changes. Other modules wait for the modules they depend on to
//! report [`ModuleState::Ready`] before they initialize.

/// Identifier of an application module
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, defmt::Format)]
pub struct ModuleId(pub u8);

/// State of an application module
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub enum ModuleState {
    /// Module is initialized and operational
    Ready,
    /// Module is not initialized or turned off
    Off,
    /// Module is suspended, for example during power down
    Standby,
    /// Module failed
    Error,
}

/// Module reported its state
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct ModuleStateEvent {
    /// Reporting module
    pub module_id: ModuleId,
    /// Reported state
    pub state: ModuleState,
}

impl ModuleStateEvent {
    /// Creates a state report of `module_id`
    pub const fn new(module_id: ModuleId, state: ModuleState) -> Self {
        Self { module_id, state }
    }

    /// Checks if this event reports `module_id` entering `state`
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::events::module_state_event::{ModuleId, ModuleState, ModuleStateEvent};
    ///
    /// const SETTINGS_LOADER: ModuleId = ModuleId(1);
    ///
    /// let event = ModuleStateEvent::new(SETTINGS_LOADER, ModuleState::Ready);
    /// assert!(event.check(SETTINGS_LOADER, ModuleState::Ready));
    /// assert!(!event.check(ModuleId(2), ModuleState::Ready));
    /// ```
    pub fn check(&self, module_id: ModuleId, state: ModuleState) -> bool {
        self.module_id == module_id && self.state == state
    }
}
