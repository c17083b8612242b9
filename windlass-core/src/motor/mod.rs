//! Motor controller
//!
//! Owns the single hoist motor's direction, speed and run state, and issues
//! start/stop/reload calls to the pulse generator. The driver board has
//! four channels; only one is wired to the drum, so there is exactly one
//! controller instance.
//!
//! State machine: `Idle -> Running` (start), `Running -> Idle` (stop), and
//! `Running -> Reversing -> Idle` for the timed reversal, which is
//! synchronous and non-reentrant.

use crate::traits::{DelayMs, Direction, PulseGenerator, TimeOfDay};

/// Run state of the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// No pulses being emitted
    Idle,
    /// Pulse train running; direction is fixed for the run
    Running,
    /// Inside the blocking timed reversal
    Reversing,
}

/// Controller for the single driven motor.
///
/// Invariant: `state != Idle` exactly when the pulse generator has been
/// issued a start with no intervening stop.
pub struct MotorController<P: PulseGenerator> {
    pulse: P,
    direction: Direction,
    reload: u16,
    state: RunState,
    run_started: Option<TimeOfDay>,
}

impl<P: PulseGenerator> MotorController<P> {
    /// Create a controller over a pulse-generator channel.
    ///
    /// `direction` is the stored power-on direction, `reload` the initial
    /// period value. Nothing is written to hardware until the first start.
    pub fn new(pulse: P, direction: Direction, reload: u16) -> Self {
        Self {
            pulse,
            direction,
            reload,
            state: RunState::Idle,
            run_started: None,
        }
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.state != RunState::Idle
    }

    /// The stored direction (the direction of the current run, if running)
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The stored reload value
    pub fn speed(&self) -> u16 {
        self.reload
    }

    /// Wall-clock time the current/most recent run began
    pub fn run_started(&self) -> Option<TimeOfDay> {
        self.run_started
    }

    /// Read access to the pulse generator
    pub fn generator(&self) -> &P {
        &self.pulse
    }

    /// Write the reload value through to the generator. Takes effect on the
    /// running cycle; never queued.
    pub fn set_speed(&mut self, reload: u16) {
        self.reload = reload;
        self.pulse.set_reload(reload);
    }

    /// Start a run in `direction`.
    ///
    /// No-op while already running: direction is fixed for a run and
    /// `run_started` is not reset.
    pub fn start(&mut self, direction: Direction, now: TimeOfDay) {
        if self.state != RunState::Idle {
            return;
        }
        self.direction = direction;
        self.pulse.set_direction(direction);
        self.pulse.set_reload(self.reload);
        self.pulse.start();
        self.state = RunState::Running;
        self.run_started = Some(now);
    }

    /// Start, or steer an already-running motor.
    ///
    /// The Up/Down path: when idle this is a plain start; when running it
    /// updates the direction line without a second pulse-generator start
    /// (the hardware forbids double-issuing start) and preserves
    /// `run_started`.
    pub fn restart(&mut self, direction: Direction, now: TimeOfDay) {
        match self.state {
            RunState::Idle => self.start(direction, now),
            RunState::Running => {
                self.direction = direction;
                self.pulse.set_direction(direction);
            }
            // unreachable from the single-threaded loop
            RunState::Reversing => {}
        }
    }

    /// Stop the run. Idempotent: a second stop is a pure no-op with no
    /// hardware call.
    pub fn stop(&mut self) {
        if self.state != RunState::Idle {
            self.pulse.stop();
            self.state = RunState::Idle;
        }
    }

    /// Reverse direction for as long as the current run has been going.
    ///
    /// Reverses the direction line, ensures a run is active, then blocks for
    /// `now - run_started` whole seconds before stopping and restoring the
    /// original direction. Returns the seconds blocked.
    ///
    /// The clock is 24-hour and date-unaware, so an interval spanning
    /// midnight computes negative; that (and a never-started motor) yields
    /// a near-instant reversal.
    pub fn reverse_for_elapsed<D: DelayMs>(&mut self, now: TimeOfDay, delay: &mut D) -> u32 {
        if self.state == RunState::Reversing {
            return 0;
        }

        let elapsed = self
            .run_started
            .map(|started| now.seconds_since(started))
            .unwrap_or(0);
        let wait_s = elapsed.max(0) as u32;

        let original = self.direction;
        self.direction = original.opposite();
        self.pulse.set_direction(self.direction);
        self.pulse.set_reload(self.reload);
        if self.state == RunState::Idle {
            self.pulse.start();
        }
        self.state = RunState::Reversing;

        delay.delay_ms(wait_s * 1000);

        self.pulse.stop();
        self.state = RunState::Idle;
        self.direction = original;
        self.pulse.set_direction(original);

        wait_s
    }
}
