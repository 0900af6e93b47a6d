//! Sensor samples and sensor state reports

use crate::error::Error;
use heapless::Vec;

/// Maximal number of channels (for example axes of an accelerometer) in a sample
pub const SENSOR_MAX_CHANNELS: usize = 3;

/// Single reading of all channels of a sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    values: Vec<f32, SENSOR_MAX_CHANNELS>,
}

impl SensorSample {
    /// Creates a sample with a value for each channel
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::events::sensor_event::SensorSample;
    ///
    /// let sample = SensorSample::new(&[0.1, -9.81, 0.0]).unwrap();
    /// assert_eq!(sample.values(), &[0.1, -9.81, 0.0]);
    ///
    /// assert!(SensorSample::new(&[0.0; 4]).is_err());
    /// ```
    pub fn new(values: &[f32]) -> Result<Self, Error> {
        let mut sample_values = Vec::new();
        for value in values {
            sample_values
                .push(*value)
                .map_err(|_| Error::TooManyChannels)?;
        }
        Ok(Self {
            values: sample_values,
        })
    }

    /// Values of the channels
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl defmt::Format for SensorSample {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.values.as_slice());
    }
}

/// New sample of a sensor
#[derive(Debug, Clone, PartialEq, defmt::Format)]
pub struct SensorEvent {
    /// Name of the sensor
    pub descriptor: &'static str,
    /// Sampled values
    pub sample: SensorSample,
}

/// State of a sensor
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub enum SensorState {
    /// Sensor is disabled
    Disabled,
    /// Sensor stopped sampling to save power
    Sleep,
    /// Sensor is sampling
    Active,
    /// Sensor failed
    Error,
}

/// Sensor changed its state
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct SensorStateEvent {
    /// Name of the sensor
    pub descriptor: &'static str,
    /// New state
    pub state: SensorState,
}
