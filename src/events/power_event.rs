//! Power management events

/// System is going to a low power state
///
/// Modules stop their activity and report [`Standby`](super::module_state_event::ModuleState).
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct PowerDownEvent {
    /// Power down is caused by an error
    pub error: bool,
}

/// System wakes up from a low power state
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct WakeUpEvent;
