//! Wall clock and delay traits

/// A 24-hour time of day, as read from the RTC.
///
/// There is no date component. Durations computed across midnight come out
/// negative; see [`TimeOfDay::seconds_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
}

impl TimeOfDay {
    /// Seconds since 00:00:00
    pub fn total_seconds(&self) -> i32 {
        self.hour as i32 * 3600 + self.min as i32 * 60 + self.sec as i32
    }

    /// Whole seconds elapsed since `earlier`.
    ///
    /// 24-hour arithmetic with no date: an interval spanning midnight
    /// computes negative. Callers treat negative as zero elapsed.
    pub fn seconds_since(&self, earlier: TimeOfDay) -> i32 {
        self.total_seconds() - earlier.total_seconds()
    }
}

/// Source of the current time of day
pub trait WallClock {
    fn now(&mut self) -> TimeOfDay;
}

impl<T: WallClock + ?Sized> WallClock for &mut T {
    fn now(&mut self) -> TimeOfDay {
        (**self).now()
    }
}

/// Blocking millisecond delay primitive
pub trait DelayMs {
    fn delay_ms(&mut self, ms: u32);
}

impl<T: DelayMs + ?Sized> DelayMs for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
