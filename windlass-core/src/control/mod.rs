//! The polling control loop
//!
//! One cooperative tick at a time: read the clock, refresh the voltage
//! reading, poll the keys, dispatch at most one link command, service the
//! heartbeat. The nominal period is ~100 ms but is not enforced - a tick
//! lasts as long as its blocking operations, and a timed reversal blocks
//! the whole loop for its duration. Nothing is concurrent: the pulse
//! generator free-runs in hardware, and the link is only ever polled.

use windlass_protocol::{telemetry_line, Command, VoltageSample};

use crate::monitor::VoltageMonitor;
use crate::motor::MotorController;
use crate::traits::{
    AnalogSampler, DelayMs, Direction, FrameLink, Heartbeat, KeyEvent, KeyPad, PulseGenerator,
    SampleError, StatusPanel, TimeOfDay, WallClock,
};

/// Nominal tick period
pub const TICK_PERIOD_MS: u32 = 100;

/// Heartbeat indicator toggles every this many ticks (~2 s)
pub const HEARTBEAT_PERIOD_TICKS: u32 = 20;

/// Conversions averaged per voltage reading
pub const SAMPLE_AVG_COUNT: u16 = 10;

/// Power-on reload value
pub const BASE_RELOAD: u16 = 100;

/// Reload for runs commanded by `power` (base plus the fixed run boost)
pub const CRUISE_RELOAD: u16 = BASE_RELOAD + 900;

/// Reload for the fixed-direction `up`/`down` runs. Numerically equal to
/// cruise on this drivetrain, but the two speeds are commanded
/// independently.
pub const SPRINT_RELOAD: u16 = BASE_RELOAD + 900;

/// What one tick did, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickSummary {
    /// Time of day at the top of the tick
    pub time: TimeOfDay,
    /// This tick's voltage reading (the previous one is retained on error)
    pub sample: Result<VoltageSample, SampleError>,
    /// Whether a periodic telemetry line went out
    pub telemetry_sent: bool,
    /// Key event serviced this tick, if any
    pub key: Option<KeyEvent>,
    /// Command dispatched this tick, if a frame was pending
    pub dispatched: Option<Command>,
    /// Seconds the tick blocked inside a timed reversal
    pub reversal_blocked_s: u32,
    /// Whether the heartbeat indicator toggled
    pub heartbeat_toggled: bool,
}

/// The top-level scheduler.
///
/// Owns the motor controller, voltage monitor, and every injected service
/// for its whole lifetime - the hardware handles live here, not in globals.
pub struct ControlLoop<P, A, L, C, D, H, K, S>
where
    P: PulseGenerator,
    A: AnalogSampler,
    L: FrameLink,
    C: WallClock,
    D: DelayMs,
    H: Heartbeat,
    K: KeyPad,
    S: StatusPanel,
{
    motor: MotorController<P>,
    monitor: VoltageMonitor<A>,
    link: L,
    clock: C,
    delay: D,
    heartbeat: H,
    keys: K,
    panel: S,
    /// Gates the per-tick telemetry push; process lifetime, starts false
    telemetry_enabled: bool,
    last_sample: Option<VoltageSample>,
    sample_faults: u32,
    ticks: u32,
}

impl<P, A, L, C, D, H, K, S> ControlLoop<P, A, L, C, D, H, K, S>
where
    P: PulseGenerator,
    A: AnalogSampler,
    L: FrameLink,
    C: WallClock,
    D: DelayMs,
    H: Heartbeat,
    K: KeyPad,
    S: StatusPanel,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        motor: MotorController<P>,
        monitor: VoltageMonitor<A>,
        link: L,
        clock: C,
        delay: D,
        heartbeat: H,
        keys: K,
        panel: S,
    ) -> Self {
        Self {
            motor,
            monitor,
            link,
            clock,
            delay,
            heartbeat,
            keys,
            panel,
            telemetry_enabled: false,
            last_sample: None,
            sample_faults: 0,
            ticks: 0,
        }
    }

    /// The motor controller
    pub fn motor(&self) -> &MotorController<P> {
        &self.motor
    }

    /// Whether periodic telemetry is currently enabled
    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled
    }

    /// The most recent good voltage reading
    pub fn last_sample(&self) -> Option<VoltageSample> {
        self.last_sample
    }

    /// Conversions aborted by timeout since power-on
    pub fn sample_faults(&self) -> u32 {
        self.sample_faults
    }

    /// Run forever at the nominal tick period
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
            self.delay.delay_ms(TICK_PERIOD_MS);
        }
    }

    /// Execute one tick
    pub fn tick(&mut self) -> TickSummary {
        self.ticks = self.ticks.wrapping_add(1);

        let time = self.clock.now();
        self.panel.show_time(time);

        let sample = self
            .monitor
            .sample_average(SAMPLE_AVG_COUNT, &mut self.delay);
        let mut telemetry_sent = false;
        match sample {
            Ok(s) => {
                self.last_sample = Some(s);
                self.panel.show_voltage(&s);
                if self.telemetry_enabled {
                    self.link.send(telemetry_line(&s).as_bytes());
                    telemetry_sent = true;
                }
            }
            Err(_) => {
                // Keep showing the previous reading instead of garbage
                self.sample_faults += 1;
                if let Some(prev) = self.last_sample {
                    self.panel.show_voltage(&prev);
                }
            }
        }

        let key = self.keys.poll();
        match key {
            Some(KeyEvent::SendTelemetry) => {
                if let Some(s) = self.last_sample {
                    self.link.send(telemetry_line(&s).as_bytes());
                }
            }
            Some(KeyEvent::WakeLink) => self.link.wake(),
            None => {}
        }

        let mut dispatched = None;
        let mut reversal_blocked_s = 0;
        if let Some(frame) = self.link.take_frame() {
            let command = Command::classify(frame.as_bytes());
            match command {
                Command::Power => {
                    self.telemetry_enabled = true;
                    self.motor.set_speed(CRUISE_RELOAD);
                    let direction = self.motor.direction();
                    self.motor.start(direction, time);
                }
                Command::Change => {
                    self.telemetry_enabled = !self.telemetry_enabled;
                    reversal_blocked_s = self.motor.reverse_for_elapsed(time, &mut self.delay);
                }
                Command::Up => {
                    self.motor.set_speed(SPRINT_RELOAD);
                    self.motor.restart(Direction::Raise, time);
                }
                Command::Down => {
                    self.motor.set_speed(SPRINT_RELOAD);
                    self.motor.restart(Direction::Lower, time);
                }
                Command::Stop => {
                    self.telemetry_enabled = false;
                    self.motor.stop();
                }
                Command::Unknown => {}
            }
            // Reception stays parked until we hand the buffer back
            self.link.restart_rx();
            dispatched = Some(command);
        }

        let heartbeat_toggled = self.ticks % HEARTBEAT_PERIOD_TICKS == 0;
        if heartbeat_toggled {
            self.heartbeat.toggle();
        }

        TickSummary {
            time,
            sample,
            telemetry_sent,
            key,
            dispatched,
            reversal_blocked_s,
            heartbeat_toggled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use std::collections::VecDeque;
    use std::string::String;
    use std::vec::Vec;
    use windlass_protocol::Frame;

    use crate::motor::RunState;

    #[derive(Debug, Default)]
    struct FakePulse {
        starts: u32,
        stops: u32,
        running: bool,
        reload: u16,
        direction: Option<Direction>,
    }

    impl PulseGenerator for FakePulse {
        fn start(&mut self) {
            self.starts += 1;
            self.running = true;
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.running = false;
        }

        fn set_reload(&mut self, reload: u16) {
            self.reload = reload;
        }

        fn set_direction(&mut self, dir: Direction) {
            self.direction = Some(dir);
        }
    }

    #[derive(Debug)]
    struct FakeSampler {
        code: u16,
        fail_after: Option<u32>,
        conversions: u32,
    }

    impl Default for FakeSampler {
        fn default() -> Self {
            Self {
                code: 2048,
                fail_after: None,
                conversions: 0,
            }
        }
    }

    impl AnalogSampler for FakeSampler {
        fn convert(&mut self) -> Result<u16, SampleError> {
            if let Some(limit) = self.fail_after {
                if self.conversions >= limit {
                    return Err(SampleError::Timeout);
                }
            }
            self.conversions += 1;
            Ok(self.code)
        }
    }

    #[derive(Debug, Default)]
    struct FakeLink {
        inbound: VecDeque<Frame>,
        awaiting_restart: bool,
        sent: String,
        restarts: u32,
        wakes: u32,
    }

    impl FakeLink {
        fn queue(&mut self, bytes: &[u8]) {
            self.inbound.push_back(Frame::new(bytes).unwrap());
        }
    }

    impl FrameLink for FakeLink {
        fn take_frame(&mut self) -> Option<Frame> {
            if self.awaiting_restart {
                return None;
            }
            let frame = self.inbound.pop_front()?;
            self.awaiting_restart = true;
            Some(frame)
        }

        fn restart_rx(&mut self) {
            self.awaiting_restart = false;
            self.restarts += 1;
        }

        fn send(&mut self, bytes: &[u8]) {
            self.sent.push_str(core::str::from_utf8(bytes).unwrap());
        }

        fn wake(&mut self) {
            self.wakes += 1;
        }
    }

    /// Interior-mutable so tests can move the clock between ticks while the
    /// loop holds a borrow
    #[derive(Debug)]
    struct FakeClock {
        now: Cell<TimeOfDay>,
    }

    impl FakeClock {
        fn at(hour: u8, min: u8, sec: u8) -> Self {
            Self {
                now: Cell::new(TimeOfDay { hour, min, sec }),
            }
        }

        fn set(&self, hour: u8, min: u8, sec: u8) {
            self.now.set(TimeOfDay { hour, min, sec });
        }
    }

    impl WallClock for &FakeClock {
        fn now(&mut self) -> TimeOfDay {
            self.now.get()
        }
    }

    #[derive(Debug, Default)]
    struct FakeDelay {
        total_ms: Cell<u32>,
    }

    impl DelayMs for &FakeDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms.set(self.total_ms.get() + ms);
        }
    }

    #[derive(Debug, Default)]
    struct FakeHeartbeat {
        toggles: u32,
    }

    impl Heartbeat for FakeHeartbeat {
        fn toggle(&mut self) {
            self.toggles += 1;
        }
    }

    #[derive(Debug, Default)]
    struct FakeKeys {
        events: VecDeque<KeyEvent>,
    }

    impl KeyPad for FakeKeys {
        fn poll(&mut self) -> Option<KeyEvent> {
            self.events.pop_front()
        }
    }

    #[derive(Debug, Default)]
    struct FakePanel {
        last_time: Option<TimeOfDay>,
        last_voltage: Option<VoltageSample>,
        voltage_updates: u32,
    }

    impl StatusPanel for FakePanel {
        fn show_time(&mut self, time: TimeOfDay) {
            self.last_time = Some(time);
        }

        fn show_voltage(&mut self, sample: &VoltageSample) {
            self.last_voltage = Some(*sample);
            self.voltage_updates += 1;
        }
    }

    /// All the fakes a loop needs, owned outside the loop so they can be
    /// inspected after it is dropped
    struct Rig {
        pulse: FakePulse,
        sampler: FakeSampler,
        link: FakeLink,
        clock: FakeClock,
        delay: FakeDelay,
        heartbeat: FakeHeartbeat,
        keys: FakeKeys,
        panel: FakePanel,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                pulse: FakePulse::default(),
                sampler: FakeSampler::default(),
                link: FakeLink::default(),
                clock: FakeClock::at(10, 0, 0),
                delay: FakeDelay::default(),
                heartbeat: FakeHeartbeat::default(),
                keys: FakeKeys::default(),
                panel: FakePanel::default(),
            }
        }
    }

    macro_rules! make_loop {
        ($rig:expr) => {
            ControlLoop::new(
                MotorController::new(&mut $rig.pulse, Direction::Lower, BASE_RELOAD),
                VoltageMonitor::new(&mut $rig.sampler),
                &mut $rig.link,
                &$rig.clock,
                &$rig.delay,
                &mut $rig.heartbeat,
                &mut $rig.keys,
                &mut $rig.panel,
            )
        };
    }

    fn tod(hour: u8, min: u8, sec: u8) -> TimeOfDay {
        TimeOfDay { hour, min, sec }
    }

    #[test]
    fn power_starts_motor_and_enables_telemetry() {
        let mut rig = Rig::new();
        rig.link.queue(b"power");
        {
            let mut ctl = make_loop!(rig);
            let summary = ctl.tick();

            assert_eq!(summary.dispatched, Some(Command::Power));
            assert!(ctl.telemetry_enabled());
            assert_eq!(ctl.motor().state(), RunState::Running);
            assert_eq!(ctl.motor().direction(), Direction::Lower);
            assert_eq!(ctl.motor().run_started(), Some(tod(10, 0, 0)));
        }
        assert_eq!(rig.pulse.starts, 1);
        assert_eq!(rig.pulse.reload, CRUISE_RELOAD);
        assert_eq!(rig.link.restarts, 1);
        // Telemetry was enabled mid-tick, after the sampling step; the push
        // happens from the next tick on
        assert!(rig.link.sent.is_empty());
    }

    #[test]
    fn telemetry_pushes_every_tick_once_enabled() {
        let mut rig = Rig::new();
        rig.link.queue(b"power");
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            let summary = ctl.tick();
            assert!(summary.telemetry_sent);
            ctl.tick();
        }
        assert_eq!(rig.link.sent, "adc:1.650\r\nadc:1.650\r\n");
    }

    #[test]
    fn stop_always_stops_and_silences() {
        let mut rig = Rig::new();
        rig.link.queue(b"power");
        rig.link.queue(b"stop");
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            let summary = ctl.tick();

            assert_eq!(summary.dispatched, Some(Command::Stop));
            assert!(!ctl.telemetry_enabled());
            assert_eq!(ctl.motor().state(), RunState::Idle);
        }
        assert_eq!(rig.pulse.stops, 1);
        assert!(!rig.pulse.running);

        // And from idle it is a harmless no-op
        let mut rig = Rig::new();
        rig.link.queue(b"stop");
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            assert_eq!(ctl.motor().state(), RunState::Idle);
        }
        assert_eq!(rig.pulse.stops, 0);
    }

    #[test]
    fn change_blocks_for_elapsed_run_and_restores_direction() {
        let mut rig = Rig::new();
        rig.link.queue(b"power");
        rig.link.queue(b"change");
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            let settle_so_far = rig.delay.total_ms.get();

            rig.clock.set(10, 0, 5);
            let summary = ctl.tick();

            assert_eq!(summary.dispatched, Some(Command::Change));
            assert_eq!(summary.reversal_blocked_s, 5);
            // Direction ends equal to its pre-command value
            assert_eq!(ctl.motor().direction(), Direction::Lower);
            assert_eq!(ctl.motor().state(), RunState::Idle);
            // Power enabled telemetry; change toggled it back off
            assert!(!ctl.telemetry_enabled());

            let reversal_ms = rig.delay.total_ms.get() - settle_so_far;
            // 5 s reversal plus this tick's settle delays
            assert!(reversal_ms >= 5000 && reversal_ms < 5100);
        }
        assert!(!rig.pulse.running);
    }

    #[test]
    fn up_and_down_run_fixed_directions_idempotently() {
        let mut rig = Rig::new();
        rig.link.queue(b"up");
        rig.link.queue(b"down");
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            assert_eq!(ctl.motor().direction(), Direction::Raise);
            assert_eq!(ctl.motor().state(), RunState::Running);

            ctl.tick();
            // Steered without a stop/start cycle
            assert_eq!(ctl.motor().direction(), Direction::Lower);
            assert_eq!(ctl.motor().state(), RunState::Running);
        }
        assert_eq!(rig.pulse.starts, 1);
        assert_eq!(rig.pulse.stops, 0);
        assert_eq!(rig.pulse.reload, SPRINT_RELOAD);
    }

    #[test]
    fn unknown_frames_have_no_effect_but_are_consumed() {
        let mut rig = Rig::new();
        rig.link.queue(b"launch");
        {
            let mut ctl = make_loop!(rig);
            let summary = ctl.tick();
            assert_eq!(summary.dispatched, Some(Command::Unknown));
            assert_eq!(ctl.motor().state(), RunState::Idle);
            assert!(!ctl.telemetry_enabled());
        }
        assert_eq!(rig.pulse.starts, 0);
        assert_eq!(rig.link.restarts, 1);
    }

    #[test]
    fn a_frame_is_dispatched_exactly_once() {
        let mut rig = Rig::new();
        rig.link.queue(b"power");
        {
            let mut ctl = make_loop!(rig);
            assert_eq!(ctl.tick().dispatched, Some(Command::Power));
            assert_eq!(ctl.tick().dispatched, None);
            assert_eq!(ctl.tick().dispatched, None);
        }
        assert_eq!(rig.link.restarts, 1);
    }

    #[test]
    fn sampling_timeout_retains_previous_reading() {
        let mut rig = Rig::new();
        // First tick's 10 conversions succeed, everything after times out
        rig.sampler.fail_after = Some(SAMPLE_AVG_COUNT as u32);
        {
            let mut ctl = make_loop!(rig);
            let first = ctl.tick();
            assert!(first.sample.is_ok());

            let second = ctl.tick();
            assert_eq!(second.sample, Err(SampleError::Timeout));
            assert_eq!(ctl.last_sample().map(|s| s.raw()), Some(2048));
            assert_eq!(ctl.sample_faults(), 1);
        }
        // The panel kept showing the last good reading
        assert_eq!(rig.panel.last_voltage.map(|s| s.raw()), Some(2048));
        assert_eq!(rig.panel.voltage_updates, 2);
    }

    #[test]
    fn telemetry_key_pushes_even_when_disabled() {
        let mut rig = Rig::new();
        rig.keys.events.push_back(KeyEvent::SendTelemetry);
        {
            let mut ctl = make_loop!(rig);
            let summary = ctl.tick();
            assert_eq!(summary.key, Some(KeyEvent::SendTelemetry));
            assert!(!ctl.telemetry_enabled());
        }
        assert_eq!(rig.link.sent, "adc:1.650\r\n");
    }

    #[test]
    fn wake_key_wakes_the_link() {
        let mut rig = Rig::new();
        rig.keys.events.push_back(KeyEvent::WakeLink);
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
        }
        assert_eq!(rig.link.wakes, 1);
        assert!(rig.link.sent.is_empty());
    }

    #[test]
    fn heartbeat_toggles_every_twentieth_tick() {
        let mut rig = Rig::new();
        {
            let mut ctl = make_loop!(rig);
            let toggled: Vec<bool> = (0..40).map(|_| ctl.tick().heartbeat_toggled).collect();
            assert_eq!(toggled.iter().filter(|&&t| t).count(), 2);
            assert!(toggled[19]);
            assert!(toggled[39]);
        }
        assert_eq!(rig.heartbeat.toggles, 2);
    }

    #[test]
    fn panel_shows_time_every_tick() {
        let mut rig = Rig::new();
        {
            let mut ctl = make_loop!(rig);
            ctl.tick();
            rig.clock.set(10, 0, 1);
            ctl.tick();
        }
        assert_eq!(rig.panel.last_time, Some(tod(10, 0, 1)));
    }
}
