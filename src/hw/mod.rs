//! Hardware abstraction layer
//!
//! Modules in this crate access peripherals only through traits defined here. Each trait has an
//! implementation for the nRF52840 and one for the mocked platform used in host builds.

pub mod leds;
