//! Portable LED output
//!
//! LEDs are dimmed with PWM. The [`LedDriver`](traits::LedDriver) trait hides the peripheral
//! from the [LED effects module](crate::modules::leds). Applications name the driver of the
//! selected platform with [`PlatformLedDriver`].
//!
//! ```
//! use nrf_caf::hw::leds::PlatformLedDriver;
//! use nrf_caf::modules::leds::{Leds, LedsConfig};
//!
//! fn status_led(driver: PlatformLedDriver) -> Leds<PlatformLedDriver> {
//!     let config = LedsConfig::default().with_led(0, &[0, 1, 2]).unwrap();
//!     Leds::new(driver, config).unwrap()
//! }
//! ```

pub mod pwm_led_driver;
pub mod traits;

#[cfg(feature = "mocked_platform")]
pub mod recording_led_driver;

/// Type of LED driver used in this build
///
/// This type must implement [`LedDriver`](traits::LedDriver) trait.
#[cfg(feature = "nrf52840")]
pub type PlatformLedDriver = pwm_led_driver::PwmLedDriver;
#[cfg(feature = "mocked_platform")]
pub type PlatformLedDriver = recording_led_driver::RecordingLedDriver;
