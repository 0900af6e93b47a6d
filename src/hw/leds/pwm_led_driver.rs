//! LED driver based on the PWM peripheral available in nRF MCUs
//!
//! The peripheral plays a one-element sequence in the individual decoder mode: each of the four
//! output channels gets its own compare value. The last value keeps being played until the next
//! update. Pin selection is left to the board support code.

use super::traits::LedDriver;
use core::ops::Deref;
use defmt::trace;

use nrf52840_hal::pac::pwm0;
type PwmRegisterBlock = pwm0::RegisterBlock;

struct PwmPeriphWrapper {
    ptr: *const PwmRegisterBlock,
}
impl PwmPeriphWrapper {
    pub fn new(pwm: &PwmRegisterBlock) -> Self {
        PwmPeriphWrapper { ptr: pwm }
    }
}
impl Deref for PwmPeriphWrapper {
    type Target = PwmRegisterBlock;
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr }
    }
}

/// Number of output channels of a PWM instance
pub const PWM_CHANNELS: u8 = 4;

/// Counter top matching the 8 bit duty cycle resolution
const COUNTER_TOP: u16 = 255;
/// Compare value flag making the output high while the counter is below the duty value
const POLARITY_FALLING_EDGE: u16 = 1 << 15;
/// 16 MHz / 16 with `COUNTER_TOP` gives a ~3.9 kHz PWM period
const PRESCALER_DIV_16: u32 = 4;

/// LED driver using a `PWM` peripheral
pub struct PwmLedDriver {
    pwm: PwmPeriphWrapper,
    sequence: &'static mut [u16; PWM_CHANNELS as usize],
}

impl PwmLedDriver {
    /// Create a new [`PwmLedDriver`] instance using passed hardware PWM instance
    ///
    /// `sequence` is read by the peripheral with DMA. It must be placed in RAM.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nrf_caf::hw::leds::pwm_led_driver::PwmLedDriver;
    /// use nrf52840_hal::pac::Peripherals;
    ///
    /// static mut SEQUENCE: [u16; 4] = [0; 4];
    ///
    /// let peripherals = Peripherals::take().unwrap();
    ///
    /// let sequence = unsafe { &mut *core::ptr::addr_of_mut!(SEQUENCE) };
    /// let driver = PwmLedDriver::new(&peripherals.PWM0, sequence);
    /// ```
    pub fn new(
        pwm: &PwmRegisterBlock,
        sequence: &'static mut [u16; PWM_CHANNELS as usize],
    ) -> Self {
        let driver = Self {
            pwm: PwmPeriphWrapper::new(pwm),
            sequence,
        };
        driver.configure();
        driver
    }

    fn configure(&self) {
        self.pwm.mode.write(|w| w.updown().up());
        self.pwm
            .prescaler
            .write(|w| unsafe { w.bits(PRESCALER_DIV_16) });
        self.pwm
            .countertop
            .write(|w| unsafe { w.countertop().bits(COUNTER_TOP) });
        self.pwm
            .decoder
            .write(|w| w.load().individual().mode().refresh_count());
        self.pwm.loop_.write(|w| unsafe { w.bits(0) });
        self.pwm.seq0.refresh.write(|w| unsafe { w.bits(0) });
        self.pwm.seq0.enddelay.write(|w| unsafe { w.bits(0) });
        self.pwm.enable.write(|w| w.enable().enabled());
    }

    fn play_sequence(&self) {
        let ptr = self.sequence.as_ptr() as u32;
        self.pwm.seq0.ptr.write(|w| unsafe { w.bits(ptr) });
        self.pwm
            .seq0
            .cnt
            .write(|w| unsafe { w.bits(u32::from(PWM_CHANNELS)) });
        self.pwm.tasks_seqstart[0].write(|w| unsafe { w.bits(1) });
    }
}

impl LedDriver for PwmLedDriver {
    fn channel_count(&self) -> u8 {
        PWM_CHANNELS
    }

    fn set_channel_duty(&mut self, channel: u8, duty: u8) {
        trace!("PWM channel {} duty {}", channel, duty);
        self.sequence[usize::from(channel)] = u16::from(duty) | POLARITY_FALLING_EDGE;
        self.play_sequence();
    }
}
