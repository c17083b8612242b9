//! Trait implementations over the board's peripherals
//!
//! Everything the control loop touches is behind a windlass-core trait;
//! this module binds those traits to the real TIM8 PWM, ADC1, USART2 and
//! the uptime counter.

use core::cell::RefCell;

use defmt::*;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Level, Output};
use embassy_stm32::mode::Async;
use embassy_stm32::peripherals::{ADC1, PA3, TIM8};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::usart::UartTx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{block_for, Duration, Instant};

use windlass_core::traits::{
    AnalogSampler, DelayMs, Direction, FrameLink, PulseGenerator, SampleError, StatusPanel,
    TimeOfDay, WallClock,
};
use windlass_drivers::link::RxFrameBuffer;
use windlass_protocol::{Frame, VoltageSample};

/// Pulse timer tick rate; a reload value is the step period in these ticks
const PULSE_TICK_HZ: u32 = 1_000_000;

/// Received frames, shared between the UART reader task and the control
/// loop's `FrameLink`
pub static RX_FRAMES: Mutex<CriticalSectionRawMutex, RefCell<RxFrameBuffer>> =
    Mutex::new(RefCell::new(RxFrameBuffer::new()));

/// Any traffic on the serial line wakes the module from sleep; the payload
/// itself is discarded by the bridge
const WAKE_BURST: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];

/// Step pulse train on TIM8 channel 1, direction line on PE0
pub struct StepperPwm {
    pwm: SimplePwm<'static, TIM8>,
    dir: Output<'static>,
}

impl StepperPwm {
    pub fn new(mut pwm: SimplePwm<'static, TIM8>, dir: Output<'static>) -> Self {
        pwm.ch1().set_duty_cycle_percent(50);
        pwm.ch1().disable();
        Self { pwm, dir }
    }
}

impl PulseGenerator for StepperPwm {
    fn start(&mut self) {
        self.pwm.ch1().enable();
    }

    fn stop(&mut self) {
        self.pwm.ch1().disable();
    }

    fn set_reload(&mut self, reload: u16) {
        self.pwm
            .set_frequency(Hertz(PULSE_TICK_HZ / reload.max(1) as u32));
        // Duty is a fraction of the period; re-pin it at 50%
        self.pwm.ch1().set_duty_cycle_percent(50);
    }

    fn set_direction(&mut self, dir: Direction) {
        // Driver board wiring: direction line high lowers the drum
        self.dir.set_level(match dir {
            Direction::Raise => Level::Low,
            Direction::Lower => Level::High,
        });
    }
}

/// Hoist supply voltage on ADC1 channel 3 (PA3), single-shot
pub struct BoardSampler {
    adc: Adc<'static, ADC1>,
    channel: PA3,
}

impl BoardSampler {
    pub fn new(adc: Adc<'static, ADC1>, channel: PA3) -> Self {
        Self { adc, channel }
    }
}

impl AnalogSampler for BoardSampler {
    fn convert(&mut self) -> Result<u16, SampleError> {
        // The HAL bounds the conversion internally; no timeout path remains
        Ok(self.adc.blocking_read(&mut self.channel))
    }
}

/// BLE bridge link: reception via [`RX_FRAMES`], transmission blocking on
/// USART2
pub struct BleLink {
    tx: UartTx<'static, Async>,
}

impl BleLink {
    pub fn new(tx: UartTx<'static, Async>) -> Self {
        Self { tx }
    }
}

impl FrameLink for BleLink {
    fn take_frame(&mut self) -> Option<Frame> {
        RX_FRAMES.lock(|buf| buf.borrow_mut().take())
    }

    fn restart_rx(&mut self) {
        RX_FRAMES.lock(|buf| buf.borrow_mut().restart())
    }

    fn send(&mut self, bytes: &[u8]) {
        if self.tx.blocking_write(bytes).is_err() {
            warn!("link tx failed, {} bytes dropped", bytes.len());
        }
        let _ = self.tx.blocking_flush();
    }

    fn wake(&mut self) {
        let _ = self.tx.blocking_write(WAKE_BURST);
        let _ = self.tx.blocking_flush();
    }
}

/// Time of day derived from the uptime counter, wrapping every 24 h
pub struct UptimeClock;

impl WallClock for UptimeClock {
    fn now(&mut self) -> TimeOfDay {
        let day_secs = (Instant::now().as_secs() % 86_400) as u32;
        TimeOfDay {
            hour: (day_secs / 3600) as u8,
            min: (day_secs / 60 % 60) as u8,
            sec: (day_secs % 60) as u8,
        }
    }
}

/// Busy-wait delay. The control loop is deliberately synchronous - the
/// timed reversal is specified to block the whole loop.
pub struct TickDelay;

impl DelayMs for TickDelay {
    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }
}

/// Status panel rendered to the debug log (no display fitted on this board)
pub struct LogPanel;

impl StatusPanel for LogPanel {
    fn show_time(&mut self, time: TimeOfDay) {
        trace!("time {=u8:02}:{=u8:02}:{=u8:02}", time.hour, time.min, time.sec);
    }

    fn show_voltage(&mut self, sample: &VoltageSample) {
        trace!("supply {=u32} mV", sample.millivolts());
    }
}
