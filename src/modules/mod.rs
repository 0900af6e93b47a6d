//! Application modules common to most nRF applications
//!
//! Each module is a [`Listener`](crate::event_bus::Listener) registered in the event bus. Modules
//! report their life-cycle with module state events, tracked by the
//! [module state tracker](module_state).

pub mod click_detector;
pub mod leds;
pub mod module_state;
pub mod sensor_data_aggregator;

#[cfg(test)]
mod tests {
    use super::click_detector::{ClickDetector, ClickDetectorConfig, CLICK_DETECTOR_MODULE_ID};
    use super::leds::{Leds, LedsConfig};
    use super::module_state::ModuleStateTracker;
    use super::sensor_data_aggregator::{SensorDataAggregator, SensorDataAggregatorConfig};
    use crate::event_bus::{EventBusBuilder, EventQueue, Handled, Listener, Subscription};
    use crate::events::button_event::ButtonEvent;
    use crate::events::click_event::{Click, ClickEvent};
    use crate::events::led_event::{LedColor, LedEffect, LedEffectStep, LedEvent, LedReadyEvent};
    use crate::events::module_state_event::{ModuleId, ModuleState};
    use crate::events::sensor_data_aggregator_event::BufferId;
    use crate::events::sensor_event::{SensorEvent, SensorSample};
    use crate::events::tick_event::TickEvent;
    use crate::events::{Event, EventType};
    use crate::hw::leds::recording_led_driver::RecordingLedDriver;
    use crate::hw::leds::PlatformLedDriver;
    use core::any::Any;

    const SETTINGS_LOADER: ModuleId = ModuleId(1);

    /// Records delivered events, optionally releasing aggregated buffers right away
    struct Consumer {
        subscriptions: std::vec::Vec<Subscription>,
        received: std::vec::Vec<Event>,
        release_buffers: bool,
    }

    impl Consumer {
        fn new(event_types: &[EventType]) -> Self {
            Self {
                subscriptions: event_types.iter().map(|t| Subscription::new(*t)).collect(),
                received: std::vec::Vec::new(),
                release_buffers: false,
            }
        }

        fn releasing_buffers(mut self) -> Self {
            self.release_buffers = true;
            self
        }
    }

    impl Listener for Consumer {
        fn name(&self) -> &'static str {
            "consumer"
        }

        fn subscriptions(&self) -> &[Subscription] {
            &self.subscriptions
        }

        fn handle(&mut self, event: &Event, queue: &EventQueue) -> Handled {
            if let (Event::Aggregator(aggregator_event), true) = (event, self.release_buffers) {
                aggregator_event.release(queue);
            }
            self.received.push(event.clone());
            Handled::Continue
        }

        fn as_any(&self) -> Option<&dyn Any> {
            Some(self)
        }

        fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
            Some(self)
        }
    }

    #[test]
    fn test_short_click_consumes_button_event() {
        let queue = EventQueue::new();
        let config = ClickDetectorConfig::default()
            .with_key(3, true)
            .unwrap()
            .with_thresholds(500, 5000);
        let mut click_detector = ClickDetector::new(config).unwrap();
        let mut consumer = Consumer::new(&[EventType::Button, EventType::Click]);

        let mut builder = EventBusBuilder::new(&queue);
        let consumer_id = builder.register(&mut consumer).unwrap();
        builder.register(&mut click_detector).unwrap();
        let mut bus = builder.build();

        queue.submit(ButtonEvent::new(3, true, 0));
        queue.submit(ButtonEvent::new(3, false, 50));
        queue.submit(ButtonEvent::new(8, true, 60));
        bus.process();

        let consumer = bus.listener::<Consumer>(consumer_id).unwrap();
        assert_eq!(
            consumer.received,
            [
                Event::Button(ButtonEvent::new(8, true, 60)),
                Event::Click(ClickEvent {
                    key_id: 3,
                    click: Click::Short
                }),
            ]
        );
        assert_eq!(queue.allocated(), 0);
    }

    #[test]
    fn test_click_detector_starts_after_gate_module_is_ready() {
        let queue = EventQueue::new();
        let mut tracker = ModuleStateTracker::new();
        tracker.register(SETTINGS_LOADER, "settings_loader").unwrap();
        tracker
            .register(CLICK_DETECTOR_MODULE_ID, "click_detector")
            .unwrap();
        let config = ClickDetectorConfig::default()
            .with_key(3, true)
            .unwrap()
            .with_gate(SETTINGS_LOADER);
        let mut click_detector = ClickDetector::new(config).unwrap();
        let mut consumer = Consumer::new(&[EventType::Click]);

        let mut builder = EventBusBuilder::new(&queue);
        let tracker_id = builder.register(&mut tracker).unwrap();
        let detector_id = builder.register(&mut click_detector).unwrap();
        let consumer_id = builder.register(&mut consumer).unwrap();
        let mut bus = builder.build();

        queue.submit(ButtonEvent::new(3, true, 0));
        queue.submit(ButtonEvent::new(3, false, 50));
        bus.process();

        assert!(bus.listener::<Consumer>(consumer_id).unwrap().received.is_empty());
        let tracker = bus.listener::<ModuleStateTracker>(tracker_id).unwrap();
        assert_eq!(tracker.get_state(CLICK_DETECTOR_MODULE_ID), ModuleState::Off);

        bus.listener_mut::<ModuleStateTracker>(tracker_id)
            .unwrap()
            .set_state(SETTINGS_LOADER, ModuleState::Ready, &queue)
            .unwrap();
        bus.process();
        assert!(bus.listener::<ClickDetector>(detector_id).unwrap().is_active());

        queue.submit(ButtonEvent::new(3, true, 100));
        queue.submit(ButtonEvent::new(3, false, 150));
        bus.process();

        let tracker = bus.listener::<ModuleStateTracker>(tracker_id).unwrap();
        assert!(tracker.all_ready(&[SETTINGS_LOADER, CLICK_DETECTOR_MODULE_ID]));
        assert_eq!(bus.listener::<Consumer>(consumer_id).unwrap().received.len(), 1);
    }

    #[test]
    fn test_led_effect_driven_by_ticks() {
        let queue = EventQueue::new();
        let config = LedsConfig::default().with_led(0, &[0, 1, 2]).unwrap();
        let mut leds = Leds::new(PlatformLedDriver::new(), config).unwrap();
        let mut consumer = Consumer::new(&[EventType::LedReady]);

        let effect = LedEffect::new(
            &[
                LedEffectStep::hold(LedColor::rgb(255, 0, 0), 100),
                LedEffectStep::hold(LedColor::rgb(0, 255, 0), 100),
            ],
            false,
        )
        .unwrap();

        let mut builder = EventBusBuilder::new(&queue);
        let leds_id = builder.register(&mut leds).unwrap();
        let consumer_id = builder.register(&mut consumer).unwrap();
        let mut bus = builder.build();

        queue.submit(LedEvent { led_id: 0, effect });
        for _ in 0..15 {
            queue.submit(TickEvent { elapsed_ms: 10 });
        }
        bus.process();

        let leds = bus.listener::<Leds<PlatformLedDriver>>(leds_id).unwrap();
        assert_eq!(leds.status(0).unwrap().color, LedColor::rgb(0, 255, 0));
        assert!(bus.listener::<Consumer>(consumer_id).unwrap().received.is_empty());

        for _ in 0..5 {
            queue.submit(TickEvent { elapsed_ms: 10 });
        }
        bus.process();

        assert_eq!(
            bus.listener::<Consumer>(consumer_id).unwrap().received,
            [Event::LedReady(LedReadyEvent { led_id: 0 })]
        );
        let leds = bus.listener::<Leds<PlatformLedDriver>>(leds_id).unwrap();
        assert_eq!(leds.driver().duty(1), 255);
    }

    #[test]
    fn test_led_event_reaches_instance_driving_the_led() {
        let queue = EventQueue::new();
        let front_config = LedsConfig::default().with_led(0, &[0]).unwrap();
        let mut front = Leds::new(RecordingLedDriver::new(), front_config).unwrap();
        let back_config = LedsConfig::default()
            .with_led(5, &[0])
            .unwrap()
            .with_module_id(ModuleId(0x10));
        let mut back = Leds::new(RecordingLedDriver::new(), back_config).unwrap();

        let mut builder = EventBusBuilder::new(&queue);
        let front_id = builder.register(&mut front).unwrap();
        let back_id = builder.register(&mut back).unwrap();
        let mut bus = builder.build();

        queue.submit(LedEvent {
            led_id: 5,
            effect: LedEffect::solid(LedColor::mono(99)),
        });
        bus.process();

        let front = bus.listener::<Leds<RecordingLedDriver>>(front_id).unwrap();
        let back = bus.listener::<Leds<RecordingLedDriver>>(back_id).unwrap();
        assert_eq!(front.driver().duty(0), 0);
        assert_eq!(back.driver().duty(0), 99);
    }

    #[test]
    fn test_aggregated_buffer_released_by_consumer() {
        let queue = EventQueue::new();
        let config = SensorDataAggregatorConfig::default()
            .with_aggregator("accel", 2)
            .unwrap();
        let mut aggregator = SensorDataAggregator::new(config).unwrap();
        let mut consumer = Consumer::new(&[EventType::Aggregator]).releasing_buffers();

        let mut builder = EventBusBuilder::new(&queue);
        let aggregator_id = builder.register(&mut aggregator).unwrap();
        let consumer_id = builder.register(&mut consumer).unwrap();
        let mut bus = builder.build();

        for n in 0..6 {
            queue.submit(SensorEvent {
                descriptor: "accel",
                sample: SensorSample::new(&[n as f32]).unwrap(),
            });
            bus.process();
        }

        let buffer_ids: std::vec::Vec<BufferId> = bus
            .listener::<Consumer>(consumer_id)
            .unwrap()
            .received
            .iter()
            .filter_map(|event| match event {
                Event::Aggregator(event) => Some(event.buffer_id),
                _ => None,
            })
            .collect();
        let slot = |slot| BufferId {
            aggregator: 0,
            slot,
        };
        assert_eq!(buffer_ids, [slot(0), slot(1), slot(0)]);

        let aggregator = bus
            .listener::<SensorDataAggregator>(aggregator_id)
            .unwrap();
        assert!(aggregator.is_buffer_available(slot(0)));
        assert!(aggregator.is_buffer_available(slot(1)));
        assert_eq!(aggregator.dropped_samples("accel"), Ok(0));
        assert_eq!(queue.allocated(), 0);
    }

    #[test]
    fn test_release_reaches_aggregator_owning_the_buffer() {
        let queue = EventQueue::new();
        let accel_config = SensorDataAggregatorConfig::default()
            .with_aggregator("accel", 1)
            .unwrap();
        let mut accel = SensorDataAggregator::new(accel_config).unwrap();
        let light_config = SensorDataAggregatorConfig::default()
            .with_aggregator("light", 1)
            .unwrap();
        let mut light = SensorDataAggregator::new(light_config).unwrap();
        let mut consumer = Consumer::new(&[EventType::Aggregator]).releasing_buffers();

        let mut builder = EventBusBuilder::new(&queue);
        builder.register(&mut accel).unwrap();
        let light_id = builder.register(&mut light).unwrap();
        builder.register(&mut consumer).unwrap();
        let mut bus = builder.build();

        queue.submit(SensorEvent {
            descriptor: "light",
            sample: SensorSample::new(&[120.0]).unwrap(),
        });
        bus.process();

        let light = bus.listener::<SensorDataAggregator>(light_id).unwrap();
        assert!(light.is_buffer_available(BufferId {
            aggregator: 0,
            slot: 0
        }));
        assert_eq!(queue.allocated(), 0);
    }
}
