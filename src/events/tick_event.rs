//! Timer tick event

/// Periodic timer tick
///
/// Submitted by a periodic timer. Time driven modules (like [LEDs](crate::modules::leds)) move
/// their state machines forward by `elapsed_ms`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct TickEvent {
    /// Time elapsed since the previous tick
    pub elapsed_ms: u32,
}
