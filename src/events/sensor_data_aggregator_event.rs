//! Buffers of aggregated sensor samples and their release
//!
//! The [aggregator](crate::modules::sensor_data_aggregator) hands a full buffer to consumers with
//! an [`AggregatorEvent`]. The buffer stays reserved until a consumer hands it back with an
//! [`AggregatorReleaseEvent`] carrying the same [`BufferId`].

use super::sensor_event::SensorSample;
use crate::event_bus::EventQueue;
use heapless::Vec;

/// Maximal number of samples in an aggregated buffer
pub const AGGREGATOR_MAX_BUFFER_SAMPLES: usize = 16;

/// Identity of an aggregated buffer
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct BufferId {
    /// Index of the sensor descriptor in the aggregator configuration
    pub aggregator: u8,
    /// Index of the buffer within the sensor descriptor
    pub slot: u8,
}

/// Buffer of aggregated samples handed to a consumer
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorEvent {
    /// Name of the sensor
    pub descriptor: &'static str,
    /// Identity of the buffer to be released
    pub buffer_id: BufferId,
    /// Aggregated samples, oldest first
    pub samples: Vec<SensorSample, AGGREGATOR_MAX_BUFFER_SAMPLES>,
}

impl AggregatorEvent {
    /// Hands the buffer back to the aggregator
    ///
    /// Consumers call it when they no longer need the samples. Until then the aggregator does
    /// not reuse the buffer.
    pub fn release(&self, queue: &EventQueue) {
        queue.submit(AggregatorReleaseEvent {
            descriptor: self.descriptor,
            buffer_id: self.buffer_id,
        });
    }
}

impl defmt::Format for AggregatorEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} {}: {} samples",
            self.descriptor,
            self.buffer_id,
            self.samples.len()
        );
    }
}

/// Consumer hands back an aggregated buffer
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct AggregatorReleaseEvent {
    /// Name of the sensor
    pub descriptor: &'static str,
    /// Identity of the released buffer
    pub buffer_id: BufferId,
}
