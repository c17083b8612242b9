//! Windlass BLE link protocol
//!
//! The hoist is commanded over a BLE-to-UART bridge running in transparent
//! mode: whatever the phone app writes to the GATT characteristic arrives on
//! the UART as raw bytes, delimited into frames by the bridge's own idle
//! detection. This crate defines the pieces of that exchange that are not
//! hardware:
//!
//! - the fixed command vocabulary (`power`, `change`, `up`, `down`, `stop`)
//!   and its prefix classifier
//! - the [`Frame`] hand-off type
//! - the `adc:<voltage>` telemetry line format
//!
//! There is no framing of our own on the wire - frame boundaries belong to
//! the bridge, commands are bare ASCII keywords with no arguments or
//! terminator requirement.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod frame;
pub mod telemetry;

pub use command::Command;
pub use frame::{Frame, FrameError, MAX_FRAME_LEN};
pub use telemetry::{telemetry_line, VoltageSample, TELEMETRY_LINE_LEN};
