//! Hardware Abstraction Layer
//!
//! Traits the generator core drives (sample clock, PWM output, trigger pin)
//! plus their STM32G474 implementations. The pure parts (prescaler search,
//! duty scaling) build on the host; everything touching registers is
//! behind the `embedded` feature.

pub mod gpio;
pub mod pwm;
pub mod timer;
#[cfg(feature = "embedded")]
pub mod uart;
