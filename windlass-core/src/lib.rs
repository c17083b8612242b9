//! Board-agnostic control logic for the Windlass hoist firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (pulse generator, analog sampler, frame
//!   link, wall clock, panel, keys, heartbeat)
//! - Motor controller and its run-state machine
//! - Voltage monitor (averaged single-shot sampling)
//! - The polling control loop that ties them together
//!
//! Hardware is injected at construction; the control loop owns its services
//! for its whole lifetime. There are no globals and no persisted state -
//! everything reinitializes to defaults on reset.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod control;
pub mod monitor;
pub mod motor;
pub mod traits;
