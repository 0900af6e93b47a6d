//! Collects sensor samples into buffers handed to consumers
//!
//! Every configured sensor descriptor has two buffers. Samples are appended to the filling
//! buffer. When it is full, the aggregator submits an [`AggregatorEvent`] and the buffer is in
//! flight: it belongs to the consumer until an [`AggregatorReleaseEvent`] with the same
//! [`BufferId`] comes back. A buffer in flight is never written.
//!
//! Only one buffer of a descriptor is in flight at a time. A buffer completed while the other one
//! is in flight waits and is submitted when the other one is released. Samples arriving while
//! both buffers are busy are handled according to the [`OverflowPolicy`].

use core::any::Any;
use crate::error::Error;
use crate::event_bus::{EventQueue, Handled, Listener, Subscription};
use crate::events::module_state_event::{ModuleId, ModuleState, ModuleStateEvent};
use crate::events::sensor_data_aggregator_event::{
    AggregatorEvent, AggregatorReleaseEvent, BufferId, AGGREGATOR_MAX_BUFFER_SAMPLES,
};
use crate::events::sensor_event::{SensorEvent, SensorSample, SensorState, SensorStateEvent};
use crate::events::{Event, EventType};
use defmt::{debug, info, trace, warn};
use heapless::Vec;

/// Maximal number of sensor descriptors handled by a [`SensorDataAggregator`]
pub const MAX_AGGREGATORS: usize = 4;

/// Number of buffers of each sensor descriptor
pub const BUFFERS_PER_AGGREGATOR: usize = 2;

/// Identifier the aggregator reports its state with, unless configured otherwise
pub const SENSOR_DATA_AGGREGATOR_MODULE_ID: ModuleId = ModuleId(0xc2);

const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription::new(EventType::Sensor),
    Subscription::new(EventType::SensorState),
    Subscription::new(EventType::AggregatorRelease).exhaustive(),
];

/// Handling of samples which cannot be stored because all buffers are busy
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, defmt::Format)]
pub enum OverflowPolicy {
    /// The sample is dropped and counted
    #[default]
    Drop,
    /// Storing the sample fails with [`Error::NoBufferAvailable`]
    ///
    /// Inside event dispatch this is fatal.
    Fail,
}

/// Sensor descriptor handled by the aggregator
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct AggregatorConfig {
    /// Name of the sensor, as in [`SensorEvent`]s
    pub descriptor: &'static str,
    /// Number of samples in a buffer
    pub buffer_capacity: usize,
}

/// Configuration of a [`SensorDataAggregator`]
///
/// # Example
///
/// ```
/// use nrf_caf::modules::sensor_data_aggregator::{OverflowPolicy, SensorDataAggregatorConfig};
///
/// let config = SensorDataAggregatorConfig::default()
///     .with_aggregator("accel", 8)
///     .unwrap()
///     .with_overflow_policy(OverflowPolicy::Fail);
///
/// assert_eq!(config.aggregators[0].buffer_capacity, 8);
/// assert!(SensorDataAggregatorConfig::default().with_aggregator("accel", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDataAggregatorConfig {
    /// Identifier the aggregator reports its state with
    pub module_id: ModuleId,
    /// Handled sensor descriptors
    pub aggregators: Vec<AggregatorConfig, MAX_AGGREGATORS>,
    /// Handling of samples arriving when all buffers are busy
    pub overflow_policy: OverflowPolicy,
}

impl Default for SensorDataAggregatorConfig {
    fn default() -> Self {
        Self {
            module_id: SENSOR_DATA_AGGREGATOR_MODULE_ID,
            aggregators: Vec::new(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl SensorDataAggregatorConfig {
    /// Adds a sensor descriptor with buffers of `buffer_capacity` samples
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidCapacity`] if `buffer_capacity` is zero or above
    ///   [`AGGREGATOR_MAX_BUFFER_SAMPLES`]
    /// * [`Error::DuplicateDescriptor`] if `descriptor` is already configured
    /// * [`Error::TooManyAggregators`] if [`MAX_AGGREGATORS`] descriptors are already configured
    pub fn with_aggregator(
        mut self,
        descriptor: &'static str,
        buffer_capacity: usize,
    ) -> Result<Self, Error> {
        if buffer_capacity == 0 || buffer_capacity > AGGREGATOR_MAX_BUFFER_SAMPLES {
            return Err(Error::InvalidCapacity);
        }
        if self.aggregators.iter().any(|a| a.descriptor == descriptor) {
            return Err(Error::DuplicateDescriptor);
        }

        self.aggregators
            .push(AggregatorConfig {
                descriptor,
                buffer_capacity,
            })
            .map_err(|_| Error::TooManyAggregators)?;
        Ok(self)
    }

    /// Sets the handling of samples arriving when all buffers are busy
    pub fn with_overflow_policy(mut self, overflow_policy: OverflowPolicy) -> Self {
        self.overflow_policy = overflow_policy;
        self
    }
}

#[derive(Debug, Default)]
struct Buffer {
    samples: Vec<SensorSample, AGGREGATOR_MAX_BUFFER_SAMPLES>,
    in_flight: bool,
}

#[derive(Debug)]
struct Aggregator {
    config: AggregatorConfig,
    buffers: [Buffer; BUFFERS_PER_AGGREGATOR],
    filling: usize,
    // The filling buffer is closed and waits for the other one to be released
    pending: bool,
    dropped_samples: u32,
}

impl Aggregator {
    fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            buffers: Default::default(),
            filling: 0,
            pending: false,
            dropped_samples: 0,
        }
    }

    fn other(&self) -> usize {
        (self.filling + 1) % BUFFERS_PER_AGGREGATOR
    }

    fn buffer_id(id: u8, slot: usize) -> BufferId {
        BufferId {
            aggregator: id,
            slot: slot as u8,
        }
    }

    /// Submits the filling buffer or marks it pending
    fn close_filling_buffer(&mut self, id: u8, queue: &EventQueue) {
        if self.buffers[self.other()].in_flight {
            trace!("{} buffer waits for release", self.config.descriptor);
            self.pending = true;
        } else {
            self.send_filling_buffer(id, queue);
        }
    }

    fn send_filling_buffer(&mut self, id: u8, queue: &EventQueue) {
        let slot = self.filling;
        self.buffers[slot].in_flight = true;
        self.pending = false;
        self.filling = self.other();

        debug!(
            "{} buffer {} sent with {} samples",
            self.config.descriptor,
            slot,
            self.buffers[slot].samples.len()
        );
        queue.submit(AggregatorEvent {
            descriptor: self.config.descriptor,
            buffer_id: Self::buffer_id(id, slot),
            samples: self.buffers[slot].samples.clone(),
        });
    }
}

/// Listener aggregating sensor samples
pub struct SensorDataAggregator {
    aggregators: Vec<Aggregator, MAX_AGGREGATORS>,
    module_id: ModuleId,
    overflow_policy: OverflowPolicy,
}

impl SensorDataAggregator {
    /// Creates an aggregator with empty buffers
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidCapacity`] if a buffer capacity is zero or above
    ///   [`AGGREGATOR_MAX_BUFFER_SAMPLES`]
    /// * [`Error::DuplicateDescriptor`] if a descriptor is configured twice
    pub fn new(config: SensorDataAggregatorConfig) -> Result<Self, Error> {
        let mut aggregators = Vec::new();
        for (i, aggregator_config) in config.aggregators.iter().enumerate() {
            let capacity = aggregator_config.buffer_capacity;
            if capacity == 0 || capacity > AGGREGATOR_MAX_BUFFER_SAMPLES {
                return Err(Error::InvalidCapacity);
            }
            if config.aggregators[..i]
                .iter()
                .any(|a| a.descriptor == aggregator_config.descriptor)
            {
                return Err(Error::DuplicateDescriptor);
            }

            aggregators
                .push(Aggregator::new(*aggregator_config))
                .map_err(|_| Error::TooManyAggregators)?;
        }

        Ok(Self {
            aggregators,
            module_id: config.module_id,
            overflow_policy: config.overflow_policy,
        })
    }

    /// Reports the module ready
    pub fn start(&mut self, queue: &EventQueue) {
        info!("Sensor data aggregator ready");
        queue.submit(ModuleStateEvent::new(self.module_id, ModuleState::Ready));
    }

    /// Stores a sample
    ///
    /// Submits an [`AggregatorEvent`] when the sample fills the buffer and no other buffer of the
    /// descriptor is in flight.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownDescriptor`] if the descriptor of `event` is not configured
    /// * [`Error::NoBufferAvailable`] if all buffers are busy and the overflow policy is
    ///   [`OverflowPolicy::Fail`]
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_caf::event_bus::EventQueue;
    /// use nrf_caf::events::sensor_event::{SensorEvent, SensorSample};
    /// use nrf_caf::modules::sensor_data_aggregator::{
    ///     SensorDataAggregator, SensorDataAggregatorConfig,
    /// };
    ///
    /// let queue = EventQueue::new();
    /// let config = SensorDataAggregatorConfig::default()
    ///     .with_aggregator("accel", 2)
    ///     .unwrap();
    /// let mut aggregator = SensorDataAggregator::new(config).unwrap();
    ///
    /// for x in [0.1, 0.2] {
    ///     let sample = SensorSample::new(&[x, 0.0, 9.81]).unwrap();
    ///     let event = SensorEvent { descriptor: "accel", sample };
    ///     aggregator.aggregate(&event, &queue).unwrap();
    /// }
    ///
    /// // Full buffer sent to consumers
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn aggregate(&mut self, event: &SensorEvent, queue: &EventQueue) -> Result<(), Error> {
        let id = self
            .find(event.descriptor)
            .ok_or(Error::UnknownDescriptor)?;
        let aggregator = &mut self.aggregators[id];

        if aggregator.pending {
            return match self.overflow_policy {
                OverflowPolicy::Drop => {
                    aggregator.dropped_samples += 1;
                    warn!("{} sample dropped, no buffer available", event.descriptor);
                    Ok(())
                }
                OverflowPolicy::Fail => Err(Error::NoBufferAvailable),
            };
        }

        let capacity = aggregator.config.buffer_capacity;
        let buffer = &mut aggregator.buffers[aggregator.filling];
        buffer
            .samples
            .push(event.sample.clone())
            .map_err(|_| Error::NoBufferAvailable)?;

        if buffer.samples.len() >= capacity {
            aggregator.close_filling_buffer(id as u8, queue);
        }

        Ok(())
    }

    /// Takes back a buffer sent to consumers
    ///
    /// A buffer waiting for this release is sent right away.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownDescriptor`] if the buffer does not belong to the descriptor
    /// * [`Error::NotInFlight`] if the buffer is not owned by a consumer
    pub fn release(
        &mut self,
        event: &AggregatorReleaseEvent,
        queue: &EventQueue,
    ) -> Result<(), Error> {
        let id = usize::from(event.buffer_id.aggregator);
        let slot = usize::from(event.buffer_id.slot);

        let aggregator = self
            .aggregators
            .get_mut(id)
            .filter(|aggregator| aggregator.config.descriptor == event.descriptor)
            .ok_or(Error::UnknownDescriptor)?;
        let buffer = aggregator
            .buffers
            .get_mut(slot)
            .filter(|buffer| buffer.in_flight)
            .ok_or(Error::NotInFlight)?;

        buffer.in_flight = false;
        buffer.samples.clear();
        trace!("{} buffer {} released", event.descriptor, slot);

        if aggregator.pending {
            aggregator.send_filling_buffer(id as u8, queue);
        }

        Ok(())
    }

    /// Sends the partially filled buffer of `descriptor`
    ///
    /// Nothing is sent if the buffer is empty. If the other buffer is in flight, the flushed
    /// buffer waits for its release.
    pub fn flush(&mut self, descriptor: &str, queue: &EventQueue) -> Result<(), Error> {
        let id = self.find(descriptor).ok_or(Error::UnknownDescriptor)?;
        let aggregator = &mut self.aggregators[id];

        if !aggregator.pending && !aggregator.buffers[aggregator.filling].samples.is_empty() {
            aggregator.close_filling_buffer(id as u8, queue);
        }

        Ok(())
    }

    /// Checks if the buffer `buffer_id` is owned by the aggregator
    ///
    /// Returns `false` while the buffer is in flight.
    pub fn is_buffer_available(&self, buffer_id: BufferId) -> bool {
        self.aggregators
            .get(usize::from(buffer_id.aggregator))
            .and_then(|aggregator| aggregator.buffers.get(usize::from(buffer_id.slot)))
            .map_or(false, |buffer| !buffer.in_flight)
    }

    /// Samples stored in the buffer `buffer_id`
    pub fn samples(&self, buffer_id: BufferId) -> Result<&[SensorSample], Error> {
        self.aggregators
            .get(usize::from(buffer_id.aggregator))
            .and_then(|aggregator| aggregator.buffers.get(usize::from(buffer_id.slot)))
            .map(|buffer| buffer.samples.as_slice())
            .ok_or(Error::UnknownDescriptor)
    }

    /// Number of samples of `descriptor` dropped because all buffers were busy
    pub fn dropped_samples(&self, descriptor: &str) -> Result<u32, Error> {
        let id = self.find(descriptor).ok_or(Error::UnknownDescriptor)?;
        Ok(self.aggregators[id].dropped_samples)
    }

    fn find(&self, descriptor: &str) -> Option<usize> {
        self.aggregators
            .iter()
            .position(|aggregator| aggregator.config.descriptor == descriptor)
    }

    fn on_sensor_event(&mut self, event: &SensorEvent, queue: &EventQueue) {
        match self.aggregate(event, queue) {
            Ok(()) | Err(Error::UnknownDescriptor) => {}
            Err(error) => panic!("Cannot aggregate {} sample: {:?}", event.descriptor, error),
        }
    }

    fn on_sensor_state_event(&mut self, event: &SensorStateEvent, queue: &EventQueue) {
        if event.state == SensorState::Sleep && self.find(event.descriptor).is_some() {
            debug!("{} sleeps, flushing buffer", event.descriptor);
            // Descriptor checked above
            let _ = self.flush(event.descriptor, queue);
        }
    }
}

impl Listener for SensorDataAggregator {
    fn name(&self) -> &'static str {
        "sensor_data_aggregator"
    }

    fn subscriptions(&self) -> &[Subscription] {
        SUBSCRIPTIONS
    }

    fn handle(&mut self, event: &Event, queue: &EventQueue) -> Handled {
        match event {
            Event::Sensor(event) => {
                self.on_sensor_event(event, queue);
                Handled::Continue
            }
            Event::SensorState(event) => {
                self.on_sensor_state_event(event, queue);
                Handled::Continue
            }
            Event::AggregatorRelease(event) => match self.release(event, queue) {
                Ok(()) => Handled::Consumed,
                // The buffer may belong to another aggregator instance
                Err(Error::UnknownDescriptor) => Handled::Continue,
                Err(error) => {
                    warn!(
                        "Ignored release of {} {}: {}",
                        event.descriptor, event.buffer_id, error
                    );
                    Handled::Consumed
                }
            },
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBusBuilder;

    const ACCEL: &str = "accel";
    const CAPACITY: usize = 4;

    fn aggregator(policy: OverflowPolicy) -> SensorDataAggregator {
        let config = SensorDataAggregatorConfig::default()
            .with_aggregator(ACCEL, CAPACITY)
            .unwrap()
            .with_aggregator("gyro", 2)
            .unwrap()
            .with_overflow_policy(policy);
        SensorDataAggregator::new(config).unwrap()
    }

    fn sample(n: usize) -> SensorEvent {
        SensorEvent {
            descriptor: ACCEL,
            sample: SensorSample::new(&[n as f32, 0.0, 0.0]).unwrap(),
        }
    }

    fn feed(
        aggregator: &mut SensorDataAggregator,
        queue: &EventQueue,
        samples: core::ops::Range<usize>,
    ) {
        for n in samples {
            aggregator.aggregate(&sample(n), queue).unwrap();
        }
    }

    fn first_value(samples: &[SensorSample]) -> std::vec::Vec<f32> {
        samples.iter().map(|s| s.values()[0]).collect()
    }

    fn pop_aggregator_event(queue: &EventQueue) -> AggregatorEvent {
        match queue.pop().as_deref() {
            Some(Event::Aggregator(event)) => event.clone(),
            other => panic!("Expected aggregator event, got {:?}", other),
        }
    }

    const ACCEL_0: BufferId = BufferId {
        aggregator: 0,
        slot: 0,
    };
    const ACCEL_1: BufferId = BufferId {
        aggregator: 0,
        slot: 1,
    };

    #[test]
    fn test_full_buffer_is_sent_once() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);

        feed(&mut aggregator, &queue, 0..CAPACITY - 1);
        assert!(queue.is_empty());

        feed(&mut aggregator, &queue, CAPACITY - 1..CAPACITY);
        let event = pop_aggregator_event(&queue);
        assert!(queue.is_empty());

        assert_eq!(event.descriptor, ACCEL);
        assert_eq!(event.buffer_id, ACCEL_0);
        assert_eq!(first_value(&event.samples), [0.0, 1.0, 2.0, 3.0]);
        assert!(!aggregator.is_buffer_available(ACCEL_0));
    }

    #[test]
    fn test_buffer_in_flight_is_not_overwritten() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);

        feed(&mut aggregator, &queue, 0..CAPACITY + 1);

        assert_eq!(queue.len(), 1);
        assert_eq!(
            first_value(aggregator.samples(ACCEL_0).unwrap()),
            [0.0, 1.0, 2.0, 3.0]
        );
        assert_eq!(first_value(aggregator.samples(ACCEL_1).unwrap()), [4.0]);
    }

    #[test]
    fn test_full_buffer_waits_for_release_of_other_one() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);

        feed(&mut aggregator, &queue, 0..2 * CAPACITY);
        let first = pop_aggregator_event(&queue);
        assert!(queue.is_empty());

        let release = AggregatorReleaseEvent {
            descriptor: ACCEL,
            buffer_id: first.buffer_id,
        };
        aggregator.release(&release, &queue).unwrap();

        let second = pop_aggregator_event(&queue);
        assert_eq!(second.buffer_id, ACCEL_1);
        assert_eq!(first_value(&second.samples), [4.0, 5.0, 6.0, 7.0]);
        assert!(aggregator.is_buffer_available(ACCEL_0));
    }

    #[test]
    fn test_samples_dropped_when_all_buffers_busy() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);

        feed(&mut aggregator, &queue, 0..2 * CAPACITY + 3);

        assert_eq!(aggregator.dropped_samples(ACCEL), Ok(3));
        assert_eq!(queue.len(), 1);
        assert_eq!(
            first_value(aggregator.samples(ACCEL_1).unwrap()),
            [4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn test_fail_policy_reports_no_buffer() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Fail);

        feed(&mut aggregator, &queue, 0..2 * CAPACITY);

        assert_eq!(
            aggregator.aggregate(&sample(100), &queue),
            Err(Error::NoBufferAvailable)
        );
    }

    #[test]
    fn test_release_round_trips_buffer_identity() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);
        feed(&mut aggregator, &queue, 0..CAPACITY);

        let event = pop_aggregator_event(&queue);
        event.release(&queue);

        let release = match queue.pop().as_deref() {
            Some(Event::AggregatorRelease(release)) => *release,
            other => panic!("Expected release event, got {:?}", other),
        };
        assert_eq!(release.buffer_id, event.buffer_id);
        assert_eq!(release.descriptor, ACCEL);

        aggregator.release(&release, &queue).unwrap();
        assert!(aggregator.is_buffer_available(event.buffer_id));
        assert!(aggregator.samples(event.buffer_id).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_releases_rejected() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);
        feed(&mut aggregator, &queue, 0..CAPACITY);

        let not_in_flight = AggregatorReleaseEvent {
            descriptor: ACCEL,
            buffer_id: ACCEL_1,
        };
        assert_eq!(aggregator.release(&not_in_flight, &queue), Err(Error::NotInFlight));

        let wrong_descriptor = AggregatorReleaseEvent {
            descriptor: "gyro",
            buffer_id: ACCEL_0,
        };
        assert_eq!(
            aggregator.release(&wrong_descriptor, &queue),
            Err(Error::UnknownDescriptor)
        );

        let unknown_slot = AggregatorReleaseEvent {
            descriptor: ACCEL,
            buffer_id: BufferId {
                aggregator: 0,
                slot: 7,
            },
        };
        assert_eq!(aggregator.release(&unknown_slot, &queue), Err(Error::NotInFlight));
        assert!(!aggregator.is_buffer_available(ACCEL_0));
    }

    #[test]
    fn test_descriptors_are_aggregated_separately() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);

        feed(&mut aggregator, &queue, 0..1);
        for _ in 0..2 {
            let gyro = SensorEvent {
                descriptor: "gyro",
                sample: SensorSample::new(&[1.0]).unwrap(),
            };
            aggregator.aggregate(&gyro, &queue).unwrap();
        }

        let event = pop_aggregator_event(&queue);
        assert_eq!(event.descriptor, "gyro");
        assert_eq!(event.buffer_id, BufferId { aggregator: 1, slot: 0 });
        assert_eq!(first_value(aggregator.samples(ACCEL_0).unwrap()), [0.0]);
    }

    #[test]
    fn test_unknown_descriptor_rejected() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);
        let event = SensorEvent {
            descriptor: "humidity",
            sample: SensorSample::new(&[40.0]).unwrap(),
        };

        assert_eq!(aggregator.aggregate(&event, &queue), Err(Error::UnknownDescriptor));
        assert_eq!(aggregator.handle(&event.into(), &queue), Handled::Continue);
    }

    #[test]
    fn test_sensor_sleep_flushes_partial_buffer() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);
        feed(&mut aggregator, &queue, 0..2);

        let sleep = SensorStateEvent {
            descriptor: ACCEL,
            state: SensorState::Sleep,
        };
        aggregator.handle(&sleep.into(), &queue);

        let event = pop_aggregator_event(&queue);
        assert_eq!(first_value(&event.samples), [0.0, 1.0]);

        // Flushing an empty buffer sends nothing
        aggregator.flush(ACCEL, &queue).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_release_of_other_instance_buffer_passed_on() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Drop);
        feed(&mut aggregator, &queue, 0..CAPACITY);
        queue.pop();

        let foreign = AggregatorReleaseEvent {
            descriptor: "light",
            buffer_id: ACCEL_0,
        };
        assert_eq!(aggregator.handle(&foreign.into(), &queue), Handled::Continue);
        assert!(!aggregator.is_buffer_available(ACCEL_0));

        let stale = AggregatorReleaseEvent {
            descriptor: ACCEL,
            buffer_id: ACCEL_1,
        };
        assert_eq!(aggregator.handle(&stale.into(), &queue), Handled::Consumed);
    }

    #[test]
    #[should_panic(expected = "NoBufferAvailable")]
    fn test_fail_policy_is_fatal_in_dispatch() {
        let queue = EventQueue::new();
        let mut aggregator = aggregator(OverflowPolicy::Fail);
        let mut builder = EventBusBuilder::new(&queue);
        builder.register(&mut aggregator).unwrap();
        let mut bus = builder.build();

        for n in 0..2 * CAPACITY + 1 {
            queue.submit(sample(n));
        }
        bus.process();
    }

    #[test]
    fn test_config_built_without_helpers_is_validated() {
        let mut aggregators = Vec::new();
        aggregators
            .push(AggregatorConfig {
                descriptor: ACCEL,
                buffer_capacity: AGGREGATOR_MAX_BUFFER_SAMPLES + 4,
            })
            .unwrap();
        let too_large = SensorDataAggregatorConfig {
            aggregators,
            ..Default::default()
        };
        assert_eq!(
            SensorDataAggregator::new(too_large).err(),
            Some(Error::InvalidCapacity)
        );

        let config = AggregatorConfig {
            descriptor: ACCEL,
            buffer_capacity: 2,
        };
        let mut aggregators = Vec::new();
        aggregators.push(config).unwrap();
        aggregators.push(config).unwrap();
        let duplicated = SensorDataAggregatorConfig {
            aggregators,
            ..Default::default()
        };
        assert_eq!(
            SensorDataAggregator::new(duplicated).err(),
            Some(Error::DuplicateDescriptor)
        );
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let config = SensorDataAggregatorConfig::default();

        assert_eq!(
            config
                .clone()
                .with_aggregator(ACCEL, AGGREGATOR_MAX_BUFFER_SAMPLES + 1)
                .err(),
            Some(Error::InvalidCapacity)
        );
        assert_eq!(
            config
                .clone()
                .with_aggregator(ACCEL, 1)
                .unwrap()
                .with_aggregator(ACCEL, 2)
                .err(),
            Some(Error::DuplicateDescriptor)
        );

        let mut config = config;
        for descriptor in ["a", "b", "c", "d"] {
            config = config.with_aggregator(descriptor, 1).unwrap();
        }
        assert_eq!(
            config.with_aggregator("e", 1).err(),
            Some(Error::TooManyAggregators)
        );
    }
}
