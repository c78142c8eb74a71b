//! Arbitrary Waveform Generator Firmware Library
//!
//! Core of an STM32G474-based arbitrary waveform generator. A text command
//! stream arrives over a UART, one period of the selected shape is rendered
//! into a lookup table, and a timer interrupt streams the table into a PWM
//! output followed by an RC reconstruction filter. A trigger pin marks a
//! configurable phase of every period.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                        │
//! │  Router  │  Interpreter  │  Loader  │  Engine  │  Console   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   SYNTHESIS / PROTOCOL                      │
//! │  Wavetables (sine/square/triangle/arbitrary)  │  Commands   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                        HAL LAYER                            │
//! │  Sample clock (TIM6)  │  PWM (TIM1)  │  GPIO  │  USART1      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                         │
//! │      embassy-rs (interrupt + thread-mode executors)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Snapshot on notify**: the interpreter owns the parameters and hands
//!   copies to the engine; nothing else mutates them
//! - **Type-driven design**: range-checked newtypes for every parameter
//! - **No unsafe in library code**: interrupt glue lives in `main.rs`
//! - **Functional core, imperative shell**: the state machines in [`awg`]
//!   perform no I/O and are tested on the host
//! - **Explicit error handling**: fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by the application (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Peripheral traits and their STM32G474 implementations.
pub mod hal;

/// Digital Signal Processing
///
/// Wavetable synthesis.
pub mod dsp;

/// Generator core state machines
pub mod awg;

/// Task bodies, shared queues and peripherals
#[cfg(feature = "embedded")]
pub mod app;

/// Communication Protocols
///
/// Command parser and console replies.
pub mod protocol;

/// Error types
pub mod error;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::error::AwgError;
    pub use crate::types::*;

    // Common traits
    pub use crate::hal::gpio::TriggerOutput;
    pub use crate::hal::pwm::PwmOutput;
    pub use crate::hal::timer::SampleClock;
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
