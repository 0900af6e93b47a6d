//! LED effect requests and LED effect programs
//!
//! An effect is a program of steps. Each step sets a color (instantly or fading from the color
//! at the step start) and lasts for a given time. After the last step the effect either starts
//! over or completes, leaving the LED in the color of the last step.

use crate::error::Error;
use heapless::Vec;

/// Number of color channels of a LED
pub const LED_COLOR_CHANNELS: usize = 3;

/// Maximal number of steps in a single effect
pub const LED_EFFECT_MAX_STEPS: usize = 8;

/// Color of a LED as intensities (0-255) of independent channels
///
/// Single channel LEDs use only the first channel.
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct LedColor {
    /// Intensity of each channel
    pub c: [u8; LED_COLOR_CHANNELS],
}

impl LedColor {
    /// All channels off
    pub const OFF: LedColor = LedColor {
        c: [0; LED_COLOR_CHANNELS],
    };

    /// Color of a RGB LED
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { c: [r, g, b] }
    }

    /// Brightness of a single channel LED
    pub const fn mono(brightness: u8) -> Self {
        Self {
            c: [brightness, 0, 0],
        }
    }

    /// Color at `elapsed_ms` of a linear transition lasting `duration_ms` from `from` to `to`
    pub fn interpolate(from: LedColor, to: LedColor, elapsed_ms: u32, duration_ms: u32) -> Self {
        if duration_ms == 0 || elapsed_ms >= duration_ms {
            return to;
        }

        let mut color = LedColor::OFF;
        for (idx, channel) in color.c.iter_mut().enumerate() {
            let start = i64::from(from.c[idx]);
            let diff = i64::from(to.c[idx]) - start;
            let value = start + diff * i64::from(elapsed_ms) / i64::from(duration_ms);
            *channel = value as u8;
        }
        color
    }
}

/// Single step of a LED effect
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct LedEffectStep {
    /// Color reached by this step
    pub color: LedColor,
    /// Duration of the step
    pub duration_ms: u32,
    /// `true` if the color changes gradually during the step, `false` if it is set at the step
    /// start
    pub fade: bool,
}

impl LedEffectStep {
    /// Step setting `color` immediately and holding it for `duration_ms`
    pub const fn hold(color: LedColor, duration_ms: u32) -> Self {
        Self {
            color,
            duration_ms,
            fade: false,
        }
    }

    /// Step changing the color gradually to `color` during `duration_ms`
    pub const fn fade(color: LedColor, duration_ms: u32) -> Self {
        Self {
            color,
            duration_ms,
            fade: true,
        }
    }
}

/// Program played by a LED
///
/// Effects are validated when created, so every existing effect can be scheduled.
///
/// # Example
///
/// ```
/// use nrf_caf::events::led_event::{LedColor, LedEffect, LedEffectStep};
///
/// let red = LedColor::rgb(255, 0, 0);
/// let green = LedColor::rgb(0, 255, 0);
///
/// let effect = LedEffect::new(
///     &[LedEffectStep::hold(red, 100), LedEffectStep::hold(green, 100)],
///     true,
/// )
/// .unwrap();
/// assert_eq!(effect.duration_ms(), 200);
///
/// assert!(LedEffect::new(&[], false).is_err());
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LedEffect {
    steps: Vec<LedEffectStep, LED_EFFECT_MAX_STEPS>,
    loop_forever: bool,
}

impl LedEffect {
    /// Creates an effect playing `steps` once, or in a loop if `loop_forever` is set
    pub fn new(steps: &[LedEffectStep], loop_forever: bool) -> Result<Self, Error> {
        if steps.is_empty() {
            return Err(Error::EmptyEffect);
        }

        let mut effect_steps = Vec::new();
        for step in steps {
            effect_steps
                .push(*step)
                .map_err(|_| Error::TooManySteps)?;
        }

        if loop_forever && steps.iter().all(|step| step.duration_ms == 0) {
            return Err(Error::ZeroDurationLoop);
        }

        Ok(Self {
            steps: effect_steps,
            loop_forever,
        })
    }

    fn single_step(step: LedEffectStep) -> Self {
        let mut steps = Vec::new();
        // Capacity is never below one step
        let _ = steps.push(step);
        Self {
            steps,
            loop_forever: false,
        }
    }

    /// Turns the LED off
    pub fn off() -> Self {
        Self::solid(LedColor::OFF)
    }

    /// Sets a constant color
    pub fn solid(color: LedColor) -> Self {
        Self::single_step(LedEffectStep::hold(color, 0))
    }

    /// Blinks with `color`, the LED is on for half of `period_ms`
    pub fn blink(period_ms: u32, color: LedColor) -> Result<Self, Error> {
        let on_time = period_ms / 2;
        Self::new(
            &[
                LedEffectStep::hold(color, on_time),
                LedEffectStep::hold(LedColor::OFF, period_ms - on_time),
            ],
            true,
        )
    }

    /// Fades in to `color` and out to off, repeatedly
    pub fn breathe(period_ms: u32, color: LedColor) -> Result<Self, Error> {
        let fade_in_time = period_ms / 2;
        Self::new(
            &[
                LedEffectStep::fade(color, fade_in_time),
                LedEffectStep::fade(LedColor::OFF, period_ms - fade_in_time),
            ],
            true,
        )
    }

    /// Steps of the effect
    pub fn steps(&self) -> &[LedEffectStep] {
        &self.steps
    }

    /// Tells if the effect starts over after the last step
    pub fn loop_forever(&self) -> bool {
        self.loop_forever
    }

    /// Duration of a single pass through all the steps
    pub fn duration_ms(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |sum, step| sum.saturating_add(step.duration_ms))
    }
}

impl defmt::Format for LedEffect {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "LedEffect(steps: {}, loop: {})",
            self.steps.len(),
            self.loop_forever
        );
    }
}

/// Request to play an effect on a LED
///
/// A new request replaces the effect currently played by the LED.
#[derive(Debug, Clone, Eq, PartialEq, defmt::Format)]
pub struct LedEvent {
    /// Identifier of the LED
    pub led_id: u8,
    /// Effect to play
    pub effect: LedEffect,
}

/// LED completed its effect and can take a new one
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct LedReadyEvent {
    /// Identifier of the LED
    pub led_id: u8,
}
