//! Hardware driver building blocks
//!
//! Concrete, board-independent implementations of the windlass-core traits
//! that need only `embedded-hal` digital pins or no hardware at all:
//!
//! - Receive-side frame buffer for the BLE serial link
//! - GPIO status LED (heartbeat)
//! - Edge-triggered two-key scanner
//!
//! Peripheral-bound implementations (timer pulse generator, ADC sampler,
//! RTC clock, UART transport) live in the firmware crate.

#![no_std]
#![deny(unsafe_code)]

pub mod keys;
pub mod led;
pub mod link;
