//! Physical key input trait
//!
//! Two board keys, observed as edge-triggered events (a held key reports
//! one event per closure). Their effects are side effects only - they do
//! not participate in the motor state machine.

/// One user key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    /// Push one telemetry line to the link now, telemetry flag or not
    SendTelemetry,
    /// Wake the BLE bridge over the serial line
    WakeLink,
}

/// Edge-triggered key scanner
pub trait KeyPad {
    /// Poll once; returns at most one event per call
    fn poll(&mut self) -> Option<KeyEvent>;
}

impl<T: KeyPad + ?Sized> KeyPad for &mut T {
    fn poll(&mut self) -> Option<KeyEvent> {
        (**self).poll()
    }
}
