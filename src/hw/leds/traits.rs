//! Traits used for LED drivers portability
//!
//! Each port of the LED output to other platform shall implement traits described in this module.
//! The implementation used by the build is selected in the [`leds`](super) module.

#[cfg(test)]
use mockall::*;

/// Output driving LED color channels
///
/// Each channel is a single color component of a LED (for example the red diode of a RGB LED)
/// dimmed with a duty cycle.
#[cfg_attr(test, automock)]
pub trait LedDriver {
    /// Number of channels available in this driver
    fn channel_count(&self) -> u8;

    /// Set the brightness of `channel`
    ///
    /// `duty` of 0 turns the channel off, 255 turns it fully on.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `channel` is not below [`channel_count`](Self::channel_count).
    fn set_channel_duty(&mut self, channel: u8, duty: u8);
}
