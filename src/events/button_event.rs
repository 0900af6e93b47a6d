//! Raw key events reported by the button driver

use super::Timestamp;

/// Key was pressed or released
///
/// Submitted by the button driver, typically from an interrupt handler.
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct ButtonEvent {
    /// Identifier of the key
    pub key_id: u16,
    /// `true` on press, `false` on release
    pub pressed: bool,
    /// Uptime when the change was detected
    pub timestamp_ms: Timestamp,
}

impl ButtonEvent {
    /// Creates a new button event
    pub const fn new(key_id: u16, pressed: bool, timestamp_ms: Timestamp) -> Self {
        Self {
            key_id,
            pressed,
            timestamp_ms,
        }
    }
}
