#![cfg_attr(not(any(test, doctest)), no_std)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! Event driven application framework for Nordic nRF SoCs.
//!
//! Application modules communicate only through typed events submitted to an
//! [`EventQueue`](event_bus::EventQueue) and dispatched in order by an
//! [`EventBus`](event_bus::EventBus). On top of the bus this crate provides the common modules
//! found in most nRF applications:
//!
//! * [module state tracking](modules::module_state) used to order initialization of modules
//! * [click detection](modules::click_detector) turning raw button events into clicks
//! * [LED effects](modules::leds) played on PWM driven LEDs
//! * [sensor data aggregation](modules::sensor_data_aggregator) with buffer release handshake

#[cfg(not(any(feature = "mocked_platform", feature = "nrf52840")))]
compile_error!("One platform must be enabled as a build feature");

#[cfg(all(feature = "mocked_platform", feature = "nrf52840"))]
compile_error!("Cannot enable multiple platforms simultaneously (mocked and nrf52840)");

#[cfg(all(test, not(feature = "mocked_platform")))]
compile_error!("For tests \"mocked_platform\" feature shall be selected");

pub mod crit_sect;
pub mod mutex;

/// Defines errors reported by this crate
pub mod error;

/// Memory management of events travelling through the event bus
pub mod evt_mem_mng;

pub mod event_bus;
pub mod events;
pub mod hw;
pub mod modules;
