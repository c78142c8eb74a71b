//! Error types for the waveform generator.
//!
//! Every per-command error is local and non-fatal: the generator keeps its
//! last good state. Only [`AwgError::HardwareFault`] stops the firmware, and
//! only during start-up.

use core::fmt;

use crate::hal::pwm::PwmError;
use crate::hal::timer::ClockError;

/// Parameter named by a rejected command operand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Output frequency
    Frequency,
    /// Output amplitude
    Amplitude,
    /// Trigger phase
    Phase,
    /// Duty cycle
    Duty,
}

impl Field {
    /// Lower-case name used in console replies
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Amplitude => "amplitude",
            Self::Phase => "phase",
            Self::Duty => "duty",
        }
    }
}

/// Bounded queue that rejected a byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fifo {
    /// Router → interpreter byte queue
    Command,
    /// Router → loader queue
    Load,
    /// Interpreter line buffer
    LineBuffer,
}

/// Peripheral that failed to come up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Peripheral {
    /// Serial command link
    Serial,
    /// PWM output
    Pwm(PwmError),
}

/// Errors raised by the generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AwgError {
    /// Operand out of range; the parameter keeps its previous value.
    Validation(Field),
    /// A queue or the line buffer was full; the byte was dropped.
    Overflow(Fifo),
    /// The sample clock cannot run at the requested rate; streaming not started.
    Configuration(ClockError),
    /// A peripheral failed to initialise.
    HardwareFault(Peripheral),
}

impl From<ClockError> for AwgError {
    fn from(e: ClockError) -> Self {
        AwgError::Configuration(e)
    }
}

impl From<PwmError> for AwgError {
    fn from(e: PwmError) -> Self {
        AwgError::HardwareFault(Peripheral::Pwm(e))
    }
}

impl AwgError {
    /// True for errors that must halt the firmware
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::HardwareFault(_))
    }
}

impl fmt::Display for AwgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwgError::Validation(field) => write!(f, "Invalid {}.", field.name()),
            AwgError::Overflow(Fifo::Command) => write!(f, "ERROR: INPUT QUEUE FULL."),
            AwgError::Overflow(Fifo::Load) => write!(f, "ERROR: ARBITRARY WAVE QUEUE FULL."),
            AwgError::Overflow(Fifo::LineBuffer) => write!(f, "Invalid command."),
            AwgError::Configuration(e) => write!(f, "ERROR: {e}."),
            AwgError::HardwareFault(Peripheral::Serial) => write!(f, "FAULT: serial init failed."),
            AwgError::HardwareFault(Peripheral::Pwm(e)) => write!(f, "FAULT: {e}."),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for AwgError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            AwgError::Validation(field) => defmt::write!(f, "invalid {=str}", field.name()),
            AwgError::Overflow(fifo) => defmt::write!(f, "overflow {}", fifo),
            AwgError::Configuration(e) => defmt::write!(f, "clock config: {}", e),
            AwgError::HardwareFault(p) => defmt::write!(f, "hardware fault: {}", p),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Fifo {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Fifo::Command => defmt::write!(f, "command"),
            Fifo::Load => defmt::write!(f, "load"),
            Fifo::LineBuffer => defmt::write!(f, "line"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Peripheral {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Peripheral::Serial => defmt::write!(f, "serial"),
            Peripheral::Pwm(e) => defmt::write!(f, "pwm {}", e),
        }
    }
}
