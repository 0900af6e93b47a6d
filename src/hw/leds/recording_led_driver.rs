//! LED driver used with the mocked platform
//!
//! It drives no hardware. The last duty cycle of each channel is stored, so it can be checked by
//! tests and host builds.

use super::traits::LedDriver;
use defmt::trace;

/// Number of channels of the [`RecordingLedDriver`]
pub const RECORDING_DRIVER_CHANNELS: u8 = 4;

/// Driver storing duty cycles in memory
///
/// # Example
///
/// ```
/// use nrf_caf::hw::leds::recording_led_driver::RecordingLedDriver;
/// use nrf_caf::hw::leds::traits::LedDriver;
///
/// let mut driver = RecordingLedDriver::new();
/// driver.set_channel_duty(2, 128);
///
/// assert_eq!(driver.duty(2), 128);
/// assert_eq!(driver.write_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingLedDriver {
    duty: [u8; RECORDING_DRIVER_CHANNELS as usize],
    write_count: usize,
}

impl RecordingLedDriver {
    /// Creates a driver with all channels off
    pub const fn new() -> Self {
        Self {
            duty: [0; RECORDING_DRIVER_CHANNELS as usize],
            write_count: 0,
        }
    }

    /// Last duty cycle set on `channel`
    pub fn duty(&self, channel: u8) -> u8 {
        self.duty[usize::from(channel)]
    }

    /// Number of duty cycle updates since the driver was created
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl LedDriver for RecordingLedDriver {
    fn channel_count(&self) -> u8 {
        RECORDING_DRIVER_CHANNELS
    }

    fn set_channel_duty(&mut self, channel: u8, duty: u8) {
        trace!("Channel {} duty {}", channel, duty);
        self.duty[usize::from(channel)] = duty;
        self.write_count += 1;
    }
}
