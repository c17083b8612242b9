//! Two-key scanner
//!
//! Edge-triggered scanner over the board's two user keys, both active-low.
//! One event per key closure, at most one event per poll; a key held across
//! polls reports nothing after its first edge. The control loop's tick
//! period doubles as the debounce interval.

use embedded_hal::digital::InputPin;
use windlass_core::traits::{KeyEvent, KeyPad};

/// Scanner over the telemetry key and the wake key
pub struct KeyScanner<K0, K1> {
    telemetry_key: K0,
    wake_key: K1,
    telemetry_was_down: bool,
    wake_was_down: bool,
}

impl<K0: InputPin, K1: InputPin> KeyScanner<K0, K1> {
    pub fn new(telemetry_key: K0, wake_key: K1) -> Self {
        Self {
            telemetry_key,
            wake_key,
            telemetry_was_down: false,
            wake_was_down: false,
        }
    }
}

impl<K0: InputPin, K1: InputPin> KeyPad for KeyScanner<K0, K1> {
    fn poll(&mut self) -> Option<KeyEvent> {
        // A read error counts as released
        let down = self.telemetry_key.is_low().unwrap_or(false);
        let edge = down && !self.telemetry_was_down;
        self.telemetry_was_down = down;
        if edge {
            // The wake key is not read this poll; a simultaneous press
            // surfaces on the next one
            return Some(KeyEvent::SendTelemetry);
        }

        let down = self.wake_key.is_low().unwrap_or(false);
        let edge = down && !self.wake_was_down;
        self.wake_was_down = down;
        if edge {
            return Some(KeyEvent::WakeLink);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    /// Level is shared so the test can flip it while the scanner owns the pin
    #[derive(Clone)]
    struct MockPin<'a> {
        low: &'a Cell<bool>,
    }

    impl embedded_hal::digital::ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.low.get())
        }
    }

    fn rig() -> (Cell<bool>, Cell<bool>) {
        (Cell::new(false), Cell::new(false))
    }

    #[test]
    fn held_key_reports_one_event() {
        let (k0, k1) = rig();
        let mut scanner = KeyScanner::new(MockPin { low: &k0 }, MockPin { low: &k1 });

        assert_eq!(scanner.poll(), None);

        k0.set(true);
        assert_eq!(scanner.poll(), Some(KeyEvent::SendTelemetry));
        assert_eq!(scanner.poll(), None, "still held");

        k0.set(false);
        assert_eq!(scanner.poll(), None);

        k0.set(true);
        assert_eq!(scanner.poll(), Some(KeyEvent::SendTelemetry), "new closure");
    }

    #[test]
    fn wake_key_maps_to_wake_event() {
        let (k0, k1) = rig();
        let mut scanner = KeyScanner::new(MockPin { low: &k0 }, MockPin { low: &k1 });

        k1.set(true);
        assert_eq!(scanner.poll(), Some(KeyEvent::WakeLink));
        assert_eq!(scanner.poll(), None);
    }

    #[test]
    fn simultaneous_press_yields_one_event_per_poll() {
        let (k0, k1) = rig();
        let mut scanner = KeyScanner::new(MockPin { low: &k0 }, MockPin { low: &k1 });

        k0.set(true);
        k1.set(true);
        assert_eq!(scanner.poll(), Some(KeyEvent::SendTelemetry));
        assert_eq!(scanner.poll(), Some(KeyEvent::WakeLink));
        assert_eq!(scanner.poll(), None);
    }
}
