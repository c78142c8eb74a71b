//! Arbitrary Waveform Generator Main Application
//!
//! Entry point for the STM32G474 firmware. Brings up the clock tree, the
//! PWM output, the sample clock and the command UART, then spawns the
//! generator tasks. A peripheral that fails to start lights the fault LED
//! and halts before any task runs.

#![no_std]
#![no_main]

use defmt::{error, info, unwrap};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt::{self, InterruptExt, Priority};
use embassy_stm32::usart::{self, BufferedUart, BufferedUartRx, BufferedUartTx};
use embassy_stm32::{bind_interrupts, peripherals};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use awg_firmware::app;
use awg_firmware::awg::Streamer;
use awg_firmware::error::{AwgError, Peripheral};
use awg_firmware::hal::gpio::FaultLed;
use awg_firmware::hal::pwm::FilterPwm;
use awg_firmware::hal::timer::BasicSampleClock;
use awg_firmware::hal::uart::line_config;
use awg_firmware::prelude::*;

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    USART1 => usart::BufferedInterruptHandler<peripherals::USART1>;
});

static UART_TX_BUF: StaticCell<[u8; UART_TX_BUFFER_SIZE]> = StaticCell::new();
static UART_RX_BUF: StaticCell<[u8; UART_RX_BUFFER_SIZE]> = StaticCell::new();

/// Runs the byte router above thread mode, below the sample clock
static EXECUTOR_ROUTER: InterruptExecutor = InterruptExecutor::new();

#[embassy_stm32::interrupt]
unsafe fn UART5() {
    EXECUTOR_ROUTER.on_interrupt();
}

#[embassy_stm32::interrupt]
fn TIM6_DAC() {
    app::on_sample_tick();
}

fn priority(level: u8) -> Priority {
    match level {
        0 => Priority::P0,
        1 => Priority::P1,
        2 => Priority::P2,
        3 => Priority::P3,
        4 => Priority::P4,
        _ => Priority::P5,
    }
}

/// Log the fault and stop with the LED lit
fn fatal(led: FaultLed<'static>, fault: AwgError) -> ! {
    error!("{}", fault);
    led.halt()
}

fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

    // HSI 16 MHz / 4 × 85 / 2 = 170 MHz
    let mut config = embassy_stm32::Config::default();
    config.rcc.pll = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL85,
        divp: None,
        divq: None,
        divr: Some(PllRDiv::DIV2),
    });
    config.rcc.sys = Sysclk::PLL1_R;
    config.rcc.boost = true;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("AWG Firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    let fault_led = FaultLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    // PWM carrier on TIM1 CH1 feeding the RC filter
    let pwm = match FilterPwm::new(p.TIM1, p.PA8, SYSTEM_CLOCK_HZ, PWM_FREQUENCY_HZ) {
        Ok(pwm) => pwm,
        Err(e) => fatal(fault_led, AwgError::from(e)),
    };
    info!("PWM carrier {} Hz on {}", PWM_FREQUENCY_HZ, pins::PWM_OUT);

    // Command link on USART1
    let uart = match BufferedUart::new(
        p.USART1,
        Irqs,
        p.PA10,
        p.PA9,
        UART_TX_BUF.init([0; UART_TX_BUFFER_SIZE]),
        UART_RX_BUF.init([0; UART_RX_BUFFER_SIZE]),
        line_config(),
    ) {
        Ok(uart) => uart,
        Err(_) => fatal(fault_led, AwgError::HardwareFault(Peripheral::Serial)),
    };
    interrupt::USART1.set_priority(priority(priorities::SERIAL_RX));
    let (tx, rx) = uart.split();
    info!("USART1 initialized at {} baud", UART_BAUD_RATE);

    // Sample clock and streamer, shared with the TIM6 interrupt
    let trigger = Output::new(p.PB0, Level::Low, Speed::VeryHigh);
    app::install(BasicSampleClock::new(p.TIM6), Streamer::new(pwm, trigger));

    interrupt::TIM6_DAC.set_priority(priority(priorities::SAMPLE_CLOCK));
    // SAFETY: the streamer and clock were installed above
    unsafe { interrupt::TIM6_DAC.enable() };

    interrupt::UART5.set_priority(priority(priorities::SERIAL_ROUTER));
    let router_spawner = EXECUTOR_ROUTER.start(interrupt::UART5);

    unwrap!(router_spawner.spawn(router_task(rx)));
    unwrap!(spawner.spawn(console_task(tx)));
    unwrap!(spawner.spawn(interpreter_task()));
    unwrap!(spawner.spawn(loader_task()));
    unwrap!(spawner.spawn(engine_task()));

    info!("Tasks spawned");
}

#[embassy_executor::task]
async fn router_task(rx: BufferedUartRx<'static>) {
    app::serial_router(rx).await
}

#[embassy_executor::task]
async fn console_task(tx: BufferedUartTx<'static>) {
    app::console(tx).await
}

#[embassy_executor::task]
async fn interpreter_task() {
    app::command_interpreter().await
}

#[embassy_executor::task]
async fn loader_task() {
    app::waveform_loader().await
}

#[embassy_executor::task]
async fn engine_task() {
    app::synthesis_engine().await
}
