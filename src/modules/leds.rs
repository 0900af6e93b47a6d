//! Plays LED effects
//!
//! Each configured LED runs its own effect: a program of color steps. A [`LedEvent`] replaces
//! the effect of its LED and starts it from the first step. [`TickEvent`]s move the effects
//! forward. When a non-looping effect reaches its end the LED keeps the color of the last step
//! and a [`LedReadyEvent`] is submitted.
//!
//! Colors are written to the [`LedDriver`] as duty cycles, one driver channel per color
//! component of the LED.

use core::any::Any;
use crate::error::Error;
use crate::event_bus::{EventQueue, Handled, Listener, Subscription};
use crate::events::led_event::{LedColor, LedEffect, LedEvent, LedReadyEvent, LED_COLOR_CHANNELS};
use crate::events::module_state_event::{ModuleId, ModuleState, ModuleStateEvent};
use crate::events::{Event, EventType};
use crate::hw::leds::traits::LedDriver;
use defmt::{debug, info};
use heapless::Vec;

/// Maximal number of LEDs driven by the [`Leds`] module
pub const MAX_LEDS: usize = 4;

/// Identifier the LEDs module reports its state with, unless configured otherwise
pub const LEDS_MODULE_ID: ModuleId = ModuleId(0xc1);

const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription::new(EventType::Led).exhaustive(),
    Subscription::new(EventType::Tick),
    Subscription::new(EventType::PowerDown),
    Subscription::new(EventType::WakeUp),
];

/// Mapping of a LED to driver channels
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct LedConfig {
    /// Identifier used in [`LedEvent`]s
    pub led_id: u8,
    /// Driver channel of each color component, a single channel for monochrome LEDs
    pub channels: &'static [u8],
}

/// Configuration of the [`Leds`] module
///
/// # Example
///
/// ```
/// use nrf_caf::modules::leds::LedsConfig;
///
/// let config = LedsConfig::default()
///     .with_led(0, &[0, 1, 2])
///     .unwrap()
///     .with_led(1, &[3])
///     .unwrap();
///
/// assert_eq!(config.leds.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LedsConfig {
    /// Identifier the module reports its state with
    pub module_id: ModuleId,
    /// Driven LEDs
    pub leds: Vec<LedConfig, MAX_LEDS>,
}

impl Default for LedsConfig {
    fn default() -> Self {
        Self {
            module_id: LEDS_MODULE_ID,
            leds: Vec::new(),
        }
    }
}

impl LedsConfig {
    /// Adds a LED driven by `channels`
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidChannel`] if there is no channel or more channels than color components
    /// * [`Error::DuplicateLed`] if `led_id` is already configured
    /// * [`Error::TooManyLeds`] if [`MAX_LEDS`] LEDs are already configured
    pub fn with_led(mut self, led_id: u8, channels: &'static [u8]) -> Result<Self, Error> {
        if channels.is_empty() || channels.len() > LED_COLOR_CHANNELS {
            return Err(Error::InvalidChannel);
        }
        if self.leds.iter().any(|led| led.led_id == led_id) {
            return Err(Error::DuplicateLed);
        }

        self.leds
            .push(LedConfig { led_id, channels })
            .map_err(|_| Error::TooManyLeds)?;
        Ok(self)
    }

    /// Sets the identifier the module reports its state with
    pub fn with_module_id(mut self, module_id: ModuleId) -> Self {
        self.module_id = module_id;
        self
    }
}

/// Progress of the effect played on a LED
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct LedStatus {
    /// Color currently displayed
    pub color: LedColor,
    /// Index of the current step, `None` when no effect is running
    pub step_index: Option<usize>,
    /// Time spent in the current step
    pub elapsed_in_step_ms: u32,
    /// Number of times a looping effect started over
    pub loop_count: u32,
}

#[derive(Debug)]
struct Led {
    config: LedConfig,
    effect: Option<LedEffect>,
    step_index: usize,
    elapsed_in_step_ms: u32,
    loop_count: u32,
    start_color: LedColor,
    color: LedColor,
}

impl Led {
    fn new(config: LedConfig) -> Self {
        Self {
            config,
            effect: None,
            step_index: 0,
            elapsed_in_step_ms: 0,
            loop_count: 0,
            start_color: LedColor::OFF,
            color: LedColor::OFF,
        }
    }

    fn start(&mut self, effect: LedEffect) {
        self.start_color = self.color;
        self.effect = Some(effect);
        self.step_index = 0;
        self.elapsed_in_step_ms = 0;
        self.loop_count = 0;
    }

    fn stop(&mut self) {
        self.effect = None;
        self.step_index = 0;
        self.elapsed_in_step_ms = 0;
    }

    /// Moves the effect forward by `elapsed_ms`
    ///
    /// Returns `true` if a non-looping effect completed.
    fn advance(&mut self, elapsed_ms: u32) -> bool {
        let Some(effect) = self.effect.as_ref() else {
            return false;
        };
        let steps = effect.steps();
        let mut remaining_ms = elapsed_ms;

        loop {
            let step = steps[self.step_index];
            let left_in_step_ms = step.duration_ms - self.elapsed_in_step_ms;

            if remaining_ms < left_in_step_ms {
                self.elapsed_in_step_ms += remaining_ms;
                self.color = if step.fade {
                    LedColor::interpolate(
                        self.start_color,
                        step.color,
                        self.elapsed_in_step_ms,
                        step.duration_ms,
                    )
                } else {
                    step.color
                };
                return false;
            }

            remaining_ms -= left_in_step_ms;
            self.start_color = step.color;
            self.color = step.color;
            self.elapsed_in_step_ms = 0;

            if self.step_index + 1 < steps.len() {
                self.step_index += 1;
            } else if effect.loop_forever() {
                // Whole passes are skipped at once
                let period_ms = effect.duration_ms();
                self.step_index = 0;
                self.loop_count = self
                    .loop_count
                    .wrapping_add(1 + remaining_ms / period_ms);
                remaining_ms %= period_ms;
            } else {
                self.stop();
                return true;
            }
        }
    }

    fn status(&self) -> LedStatus {
        LedStatus {
            color: self.color,
            step_index: self.effect.as_ref().map(|_| self.step_index),
            elapsed_in_step_ms: self.elapsed_in_step_ms,
            loop_count: self.loop_count,
        }
    }
}

/// Listener playing LED effects with a [`LedDriver`]
pub struct Leds<D: LedDriver> {
    driver: D,
    leds: Vec<Led, MAX_LEDS>,
    module_id: ModuleId,
    suspended: bool,
}

impl<D: LedDriver> Leds<D> {
    /// Creates the module with all LEDs off
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidChannel`] if a LED has no channel, more channels than color components
    ///   or a channel the driver does not have
    /// * [`Error::DuplicateLed`] if a LED is configured twice
    pub fn new(driver: D, config: LedsConfig) -> Result<Self, Error> {
        let channel_count = driver.channel_count();
        let mut leds = Vec::new();

        for (i, led_config) in config.leds.iter().enumerate() {
            let channels = led_config.channels;
            if channels.is_empty()
                || channels.len() > LED_COLOR_CHANNELS
                || channels.iter().any(|ch| *ch >= channel_count)
            {
                return Err(Error::InvalidChannel);
            }
            if config.leds[..i]
                .iter()
                .any(|led| led.led_id == led_config.led_id)
            {
                return Err(Error::DuplicateLed);
            }
            leds.push(Led::new(*led_config))
                .map_err(|_| Error::TooManyLeds)?;
        }

        let mut module = Self {
            driver,
            leds,
            module_id: config.module_id,
            suspended: false,
        };
        for idx in 0..module.leds.len() {
            module.write_color(idx);
        }

        Ok(module)
    }

    /// Reports the module ready
    pub fn start(&mut self, queue: &EventQueue) {
        info!("LEDs ready");
        queue.submit(ModuleStateEvent::new(self.module_id, ModuleState::Ready));
    }

    /// Replaces the effect played on `led_id`
    ///
    /// The effect starts from its first step. Steps of zero duration complete right away.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLed`] if `led_id` is not configured
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::event_bus::EventQueue;
    /// use nrf_caf::events::led_event::{LedColor, LedEffect};
    /// use nrf_caf::hw::leds::recording_led_driver::RecordingLedDriver;
    /// use nrf_caf::modules::leds::{Leds, LedsConfig};
    ///
    /// let queue = EventQueue::new();
    /// let config = LedsConfig::default().with_led(0, &[0, 1, 2]).unwrap();
    /// let mut leds = Leds::new(RecordingLedDriver::new(), config).unwrap();
    ///
    /// let effect = LedEffect::blink(1000, LedColor::rgb(0, 0, 255)).unwrap();
    /// leds.set_effect(0, effect, &queue).unwrap();
    ///
    /// assert_eq!(leds.driver().duty(2), 255);
    /// ```
    pub fn set_effect(
        &mut self,
        led_id: u8,
        effect: LedEffect,
        queue: &EventQueue,
    ) -> Result<(), Error> {
        let idx = self.find(led_id).ok_or(Error::UnknownLed)?;

        debug!("LED {} plays {}", led_id, effect);
        self.leds[idx].start(effect);
        self.advance(idx, 0, queue);
        Ok(())
    }

    /// Moves all running effects forward by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: u32, queue: &EventQueue) {
        if self.suspended {
            return;
        }

        for idx in 0..self.leds.len() {
            self.advance(idx, elapsed_ms, queue);
        }
    }

    /// Progress of the effect played on `led_id`
    pub fn status(&self, led_id: u8) -> Result<LedStatus, Error> {
        let idx = self.find(led_id).ok_or(Error::UnknownLed)?;
        Ok(self.leds[idx].status())
    }

    /// Driver the LEDs are connected to
    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn find(&self, led_id: u8) -> Option<usize> {
        self.leds.iter().position(|led| led.config.led_id == led_id)
    }

    fn advance(&mut self, idx: usize, elapsed_ms: u32, queue: &EventQueue) {
        let led = &mut self.leds[idx];
        let previous_color = led.color;
        let completed = led.advance(elapsed_ms);

        if led.color != previous_color || elapsed_ms == 0 {
            self.write_color(idx);
        }

        if completed {
            let led_id = self.leds[idx].config.led_id;
            debug!("LED {} effect done", led_id);
            queue.submit(LedReadyEvent { led_id });
        }
    }

    fn write_color(&mut self, idx: usize) {
        if self.suspended {
            return;
        }

        let led = &self.leds[idx];
        for (channel, duty) in led.config.channels.iter().zip(led.color.c.iter()) {
            self.driver.set_channel_duty(*channel, *duty);
        }
    }

    fn on_power_down(&mut self, queue: &EventQueue) {
        if self.suspended {
            return;
        }

        for idx in 0..self.leds.len() {
            self.leds[idx].stop();
            self.leds[idx].color = LedColor::OFF;
            self.write_color(idx);
        }
        self.suspended = true;

        queue.submit(ModuleStateEvent::new(self.module_id, ModuleState::Standby));
    }

    fn on_wake_up(&mut self, queue: &EventQueue) {
        if !self.suspended {
            return;
        }

        self.suspended = false;
        for idx in 0..self.leds.len() {
            self.write_color(idx);
        }

        queue.submit(ModuleStateEvent::new(self.module_id, ModuleState::Ready));
    }
}

impl<D: LedDriver + 'static> Listener for Leds<D> {
    fn name(&self) -> &'static str {
        "leds"
    }

    fn subscriptions(&self) -> &[Subscription] {
        SUBSCRIPTIONS
    }

    fn handle(&mut self, event: &Event, queue: &EventQueue) -> Handled {
        match event {
            Event::Led(LedEvent { led_id, effect }) => {
                match self.set_effect(*led_id, effect.clone(), queue) {
                    Ok(()) => Handled::Consumed,
                    Err(_) => {
                        // The LED may be driven by another instance
                        debug!("LED {} not driven by this module", led_id);
                        Handled::Continue
                    }
                }
            }
            Event::Tick(tick) => {
                self.tick(tick.elapsed_ms, queue);
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
