//! Status panel and heartbeat traits
//!
//! Rendering is external; only the numeric contract crosses this seam
//! (time of day, raw code, integer volts and the 3-digit millivolt
//! fraction are all available from the passed values).

use windlass_protocol::VoltageSample;

use super::clock::TimeOfDay;

/// The board's status display
pub trait StatusPanel {
    /// Show the current time of day
    fn show_time(&mut self, time: TimeOfDay);

    /// Show the latest voltage reading
    fn show_voltage(&mut self, sample: &VoltageSample);
}

impl<T: StatusPanel + ?Sized> StatusPanel for &mut T {
    fn show_time(&mut self, time: TimeOfDay) {
        (**self).show_time(time)
    }

    fn show_voltage(&mut self, sample: &VoltageSample) {
        (**self).show_voltage(sample)
    }
}

/// The liveness indicator, toggled periodically by the control loop and on
/// a fixed cadence by the fail-stop path
pub trait Heartbeat {
    fn toggle(&mut self);
}

impl<T: Heartbeat + ?Sized> Heartbeat for &mut T {
    fn toggle(&mut self) {
        (**self).toggle()
    }
}
