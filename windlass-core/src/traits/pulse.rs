//! Pulse generator trait
//!
//! The stepper is driven by a hardware pulse train: a timer channel emits
//! steps autonomously once started, and the winding direction is a separate
//! discrete output line. The only runtime controls are start, stop, the
//! period reload value, and the direction line.

/// Hoist travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Wind the drum in (load travels up)
    Raise,
    /// Pay the drum out (load travels down)
    Lower,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Raise => Direction::Lower,
            Direction::Lower => Direction::Raise,
        }
    }
}

/// One pulse-train channel with a runtime-mutable period.
///
/// The generator free-runs in hardware after `start` - no polling is needed
/// to sustain pulses. Implementations must tolerate `set_reload` while
/// running (the new period takes effect on the current cycle, it is never
/// queued) and `set_direction` at any time.
pub trait PulseGenerator {
    /// Begin emitting pulses at the configured reload value
    fn start(&mut self);

    /// Stop emitting pulses
    fn stop(&mut self);

    /// Write the period reload value. Lower values mean a faster pulse
    /// train (faster motor).
    fn set_reload(&mut self, reload: u16);

    /// Drive the direction line
    fn set_direction(&mut self, dir: Direction);
}

impl<T: PulseGenerator + ?Sized> PulseGenerator for &mut T {
    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn set_reload(&mut self, reload: u16) {
        (**self).set_reload(reload)
    }

    fn set_direction(&mut self, dir: Direction) {
        (**self).set_direction(dir)
    }
}
