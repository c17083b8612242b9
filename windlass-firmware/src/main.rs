//! Windlass - Bluetooth-commanded hoist firmware
//!
//! Firmware binary for the STM32F407 control board: one stepper winch
//! driven by short ASCII commands arriving over a BLE-to-UART bridge,
//! with supply-voltage telemetry pushed back over the same link.

#![no_std]
#![no_main]

mod hw;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::adc::{Adc, SampleTime};
use embassy_stm32::bind_interrupts;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pull, Speed};
use embassy_stm32::mode::Async;
use embassy_stm32::peripherals::USART2;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::usart::{self, Uart, UartRx};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use windlass_core::control::{ControlLoop, BASE_RELOAD, TICK_PERIOD_MS};
use windlass_core::monitor::VoltageMonitor;
use windlass_core::motor::MotorController;
use windlass_core::traits::{Direction, Heartbeat};
use windlass_drivers::keys::KeyScanner;
use windlass_drivers::led::Led;
use windlass_protocol::MAX_FRAME_LEN;

bind_interrupts!(struct Irqs {
    USART2 => usart::InterruptHandler<USART2>;
});

/// Blink period of the fail-stop indicator
const FAIL_BLINK_MS: u64 = 200;

type BoardControlLoop = ControlLoop<
    hw::StepperPwm,
    hw::BoardSampler,
    hw::BleLink,
    hw::UptimeClock,
    hw::TickDelay,
    Led<Output<'static>>,
    KeyScanner<Input<'static>, Input<'static>>,
    hw::LogPanel,
>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Windlass firmware starting...");

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized, sysclk 168 MHz");

    // LED0 is the heartbeat; it doubles as the fail-stop indicator during
    // bring-up
    let status_led = Led::new_active_low(Output::new(p.PF9, Level::High, Speed::Low));

    // BLE bridge on USART2 (PD5 TX / PD6 RX), transparent mode 115200-8-N-1
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = 115200;
    let uart = match Uart::new(
        p.USART2,
        p.PD6, // RX
        p.PD5, // TX
        Irqs,
        p.DMA1_CH6,
        p.DMA1_CH5,
        uart_config,
    ) {
        Ok(uart) => uart,
        Err(_) => {
            error!("BLE link bring-up failed");
            fail_stop(status_led).await;
        }
    };
    let (tx, rx) = uart.split();
    let link = hw::BleLink::new(tx);
    info!("BLE link on USART2 at 115200");

    // Step pulses on TIM8 channel 1 (PC6), direction on PE0
    let pwm = SimplePwm::new(
        p.TIM8,
        Some(PwmPin::new_ch1(p.PC6, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz::khz(1),
        CountingMode::EdgeAlignedUp,
    );
    let dir = Output::new(p.PE0, Level::High, Speed::Low);
    let pulse = hw::StepperPwm::new(pwm, dir);
    info!("Pulse generator on TIM8 ch1");

    // Supply voltage on ADC1 channel 3 (PA3), slowest sample time for
    // accuracy
    let mut adc = Adc::new(p.ADC1);
    adc.set_sample_time(SampleTime::CYCLES480);
    let sampler = hw::BoardSampler::new(adc, p.PA3);
    info!("Sampler on ADC1 ch3");

    // KEY0 sends a telemetry line, KEY1 wakes the bridge; both active-low
    let keys = KeyScanner::new(Input::new(p.PE4, Pull::Up), Input::new(p.PE3, Pull::Up));

    let motor = MotorController::new(pulse, Direction::Lower, BASE_RELOAD);
    let monitor = VoltageMonitor::new(sampler);
    let ctl = ControlLoop::new(
        motor,
        monitor,
        link,
        hw::UptimeClock,
        hw::TickDelay,
        status_led,
        keys,
        hw::LogPanel,
    );

    spawner.spawn(link_rx_task(rx)).unwrap();
    spawner.spawn(control_task(ctl)).unwrap();
    info!("Control loop running");
}

/// HSE 8 MHz crystal through the PLL to 168 MHz sysclk
fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz::mhz(8),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL336,
        divp: Some(PllPDiv::DIV2), // 8 / 8 * 336 / 2 = 168 MHz
        divq: Some(PllQDiv::DIV7), // 48 MHz for USB/SDIO
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config
}

/// Fatal bring-up failure: blink the status LED forever. No retry - a board
/// that cannot reach its link must not move the hoist.
async fn fail_stop(mut led: Led<Output<'static>>) -> ! {
    loop {
        led.toggle();
        Timer::after_millis(FAIL_BLINK_MS).await;
    }
}

/// Feeds received UART bytes into the shared frame buffer; the idle gap
/// marks the frame boundary, matching the bridge's transparent-mode framing
#[embassy_executor::task]
async fn link_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Link RX task started");

    let mut buf = [0u8; MAX_FRAME_LEN];
    loop {
        match rx.read_until_idle(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("link rx {} bytes", n);
                hw::RX_FRAMES.lock(|frames| {
                    let mut frames = frames.borrow_mut();
                    for &byte in &buf[..n] {
                        frames.push_byte(byte);
                    }
                    frames.complete();
                });
            }
            Ok(_) => {}
            Err(e) => {
                warn!("link rx error: {:?}", e);
                Timer::after_millis(10).await;
            }
        }
    }
}

/// Runs the synchronous control loop at its nominal tick period
#[embassy_executor::task]
async fn control_task(mut ctl: BoardControlLoop) {
    info!("Control task started");

    loop {
        let summary = ctl.tick();

        if let Some(cmd) = summary.dispatched {
            info!("dispatched {}", cmd);
        }
        if summary.reversal_blocked_s > 0 {
            info!("reversal held the loop for {} s", summary.reversal_blocked_s);
        }
        if summary.sample.is_err() {
            warn!("voltage sampling timed out, keeping previous reading");
        }

        Timer::after_millis(TICK_PERIOD_MS as u64).await;
    }
}
