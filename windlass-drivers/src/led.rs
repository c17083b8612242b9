//! GPIO status LED
//!
//! Drives one indicator LED through an `embedded-hal` output pin. The
//! board's LEDs sink current, so they are active-low by default; the
//! logical state is tracked here rather than read back from the pin.

use embedded_hal::digital::OutputPin;
use windlass_core::traits::Heartbeat;

/// One status LED
pub struct Led<P> {
    pin: P,
    /// If true, LED ON = pin LOW
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> Led<P> {
    /// Wrap a pin, driving the LED off immediately
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self {
            pin,
            active_low,
            on: false,
        };
        led.set(false);
        led
    }

    /// Current-sinking LED (pin low turns it on)
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Current-sourcing LED (pin high turns it on)
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
        let result = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        // GPIO writes on this hardware cannot fail
        let _ = result;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> Heartbeat for Led<P> {
    fn toggle(&mut self) {
        self.set(!self.on);
    }
}
