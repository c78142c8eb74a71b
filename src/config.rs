//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the waveform generator.
//! Table sizes, protocol bytes, parameter limits, clock and pin assignments
//! are centralized here.

use crate::dsp::wavetable::SineMode;

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// Number of duty-cycle samples per output period
pub const WAVEFORM_SIZE: usize = 400;

/// Maximum output frequency in Hz
pub const MAX_FREQUENCY_HZ: u16 = 300;

/// Maximum amplitude in tenths of a volt (3.3 V)
pub const MAX_AMPLITUDE_DV: u8 = 33;

/// Phase range in degrees (360 is normalized to 0)
pub const MAX_PHASE_DEG: u16 = 360;

/// Maximum duty cycle in percent
pub const MAX_DUTY_PERCENT: u8 = 100;

/// Duty cycle at power-up for square and triangle waves
pub const DEFAULT_DUTY_PERCENT: u8 = 50;

/// Full-scale value of the PWM duty domain
pub const DUTY_MAX: u16 = 254;

/// Number of samples the trigger output stays asserted after the phase index
pub const TRIGGER_WIDTH: usize = WAVEFORM_SIZE / 20;

/// Command line buffer size (one letter plus up to three digits)
pub const INPUT_BUFFER_SIZE: usize = 6;

/// Depth of the router → interpreter byte queue
pub const COMMAND_QUEUE_DEPTH: usize = 6;

/// Depth of the router → loader queue
pub const LOAD_QUEUE_DEPTH: usize = 64;

/// Depth of the console reply queue
pub const CONSOLE_QUEUE_DEPTH: usize = 16;

/// Byte that switches the router into arbitrary-load mode
pub const LOAD_START_BYTE: u8 = b'l';

/// Byte that aborts an arbitrary-waveform transfer
pub const LOAD_END_BYTE: u8 = 0xFF;

/// Byte that clears the command buffer and any pending load bytes
pub const RESET_BYTE: u8 = b'r';

/// Sine synthesis law used by the engine
pub const SINE_MODE: SineMode = SineMode::FullPeriod;

/// PWM carrier frequency applied to the output filter
///
/// Chosen so the compare register spans `DUTY_MAX` steps at the
/// timer kernel clock.
pub const PWM_FREQUENCY_HZ: u32 = SYSTEM_CLOCK_HZ / (DUTY_MAX as u32 + 1);

/// Prescaler ladder available to the sample clock
pub const TIMER_PRESCALERS: [u16; 8] = [1, 2, 4, 8, 16, 32, 64, 256];

/// Largest auto-reload value of a 16-bit timer
pub const TIMER_MAX_PERIOD: u32 = 65_535;

/// UART baud rate of the command link
pub const UART_BAUD_RATE: u32 = 115_200;

/// UART receive ring size
pub const UART_RX_BUFFER_SIZE: usize = 64;

/// UART transmit ring size
pub const UART_TX_BUFFER_SIZE: usize = 128;

/// Console line buffer size
pub const CONSOLE_LINE_SIZE: usize = 96;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the board wiring

    /// PWM output to the reconstruction filter (TIM1 CH1)
    pub const PWM_OUT: &str = "PA8";

    /// External trigger marker
    pub const TRIGGER_OUT: &str = "PB0";

    /// Fault LED, lit when start-up fails
    pub const FAULT_LED: &str = "PA5";

    /// Command link TX (USART1)
    pub const UART_TX: &str = "PA9";

    /// Command link RX (USART1)
    pub const UART_RX: &str = "PA10";
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// PWM carrier timer
    pub const PWM: u8 = 1;

    /// Sample clock (basic timer, update interrupt drives streaming)
    pub const SAMPLE_CLOCK: u8 = 6;
}

/// Interrupt priorities (lower number is more urgent)
pub mod priorities {
    //! NVIC priority assignments

    /// Sample clock tick, must finish within one sample period
    pub const SAMPLE_CLOCK: u8 = 1;

    /// USART1 receive interrupt (fills the UART ring)
    pub const SERIAL_RX: u8 = 2;

    /// Interrupt executor running the byte router
    pub const SERIAL_ROUTER: u8 = 3;
}
