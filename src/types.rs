//! Shared types used across the AWG firmware
//!
//! This module defines domain-specific types that enforce the parameter
//! limits of the generator. Every constructor range-checks its input and
//! returns `None` when the value is not representable, so a stored value
//! is always a validated one.

use core::fmt;

use crate::config::{
    DEFAULT_DUTY_PERCENT, DUTY_MAX, MAX_AMPLITUDE_DV, MAX_DUTY_PERCENT, MAX_FREQUENCY_HZ,
    MAX_PHASE_DEG, WAVEFORM_SIZE,
};

/// Output frequency in Hertz (0 to 300)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Frequency(u16);

impl Frequency {
    /// Maximum supported frequency
    pub const MAX_HZ: u16 = MAX_FREQUENCY_HZ;

    /// 0 Hz, the power-up value
    pub const ZERO: Self = Self(0);

    /// Create a new Frequency from Hz, returns None if out of range
    #[must_use]
    pub const fn from_hz(hz: u16) -> Option<Self> {
        if hz <= Self::MAX_HZ {
            Some(Self(hz))
        } else {
            None
        }
    }

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u16 {
        self.0
    }

    /// Sample clock rate needed to play one table per period
    #[must_use]
    pub const fn sample_rate(self) -> u32 {
        self.0 as u32 * WAVEFORM_SIZE as u32
    }

    /// True for 0 Hz
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} Hz)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}

/// Output amplitude in tenths of a volt (0.0 V to 3.3 V)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amplitude(u8);

impl Amplitude {
    /// Full-scale amplitude
    pub const MAX_DV: u8 = MAX_AMPLITUDE_DV;

    /// Full-scale amplitude value
    pub const FULL: Self = Self(MAX_AMPLITUDE_DV);

    /// 0.0 V
    pub const ZERO: Self = Self(0);

    /// Create from tenths of a volt, returns None if out of range
    #[must_use]
    pub const fn from_decivolts(dv: u8) -> Option<Self> {
        if dv <= Self::MAX_DV {
            Some(Self(dv))
        } else {
            None
        }
    }

    /// Get the amplitude in tenths of a volt
    #[must_use]
    pub const fn as_decivolts(self) -> u8 {
        self.0
    }

    /// Duty-cycle ceiling that produces this amplitude
    ///
    /// Scales linearly so full-scale amplitude maps to `DUTY_MAX`.
    #[must_use]
    pub const fn max_duty(self) -> u16 {
        self.0 as u16 * DUTY_MAX / Self::MAX_DV as u16
    }

    /// True for 0.0 V
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Amplitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitude({}.{} V)", self.0 / 10, self.0 % 10)
    }
}

impl fmt::Display for Amplitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} V", self.0 / 10, self.0 % 10)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Amplitude {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}.{} V", self.0 / 10, self.0 % 10);
    }
}

/// Phase offset of the trigger marker in degrees (0 to 359)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Phase(u16);

impl Phase {
    /// Trigger at the start of the table
    pub const ZERO: Self = Self(0);

    /// Create from degrees. 360 wraps to 0, anything above is rejected.
    #[must_use]
    pub const fn from_degrees(deg: u16) -> Option<Self> {
        if deg < MAX_PHASE_DEG {
            Some(Self(deg))
        } else if deg == MAX_PHASE_DEG {
            Some(Self(0))
        } else {
            None
        }
    }

    /// Get the phase in degrees
    #[must_use]
    pub const fn as_degrees(self) -> u16 {
        self.0
    }

    /// Table index where the trigger window starts
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize * WAVEFORM_SIZE / MAX_PHASE_DEG as usize
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase({} deg)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Phase {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} deg", self.0);
    }
}

/// Duty cycle of square and triangle waves in percent (0 to 100)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DutyPercent(u8);

impl DutyPercent {
    /// Maximum duty cycle
    pub const MAX: u8 = MAX_DUTY_PERCENT;

    /// Power-up duty cycle
    pub const DEFAULT: Self = Self(DEFAULT_DUTY_PERCENT);

    /// Create from percent, returns None if out of range
    #[must_use]
    pub const fn from_percent(percent: u8) -> Option<Self> {
        if percent <= Self::MAX {
            Some(Self(percent))
        } else {
            None
        }
    }

    /// Get the duty cycle in percent
    #[must_use]
    pub const fn as_percent(self) -> u8 {
        self.0
    }

    /// First table index past the high (or rising) part of the period
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize * WAVEFORM_SIZE / Self::MAX as usize
    }
}

impl Default for DutyPercent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for DutyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DutyPercent({}%)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DutyPercent {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}%", self.0);
    }
}

/// Waveform shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WaveType {
    /// Output held at zero
    #[default]
    Off,
    /// Sine wave
    Sine,
    /// Square wave with adjustable duty cycle
    Square,
    /// Triangle wave with adjustable rise fraction
    Triangle,
    /// Previously loaded sample table
    Arbitrary,
}

impl WaveType {
    /// Map a command letter (case-insensitive) to a wave type
    #[must_use]
    pub const fn from_letter(letter: u8) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            b'S' => Some(Self::Sine),
            b'T' => Some(Self::Triangle),
            b'Q' => Some(Self::Square),
            b'A' => Some(Self::Arbitrary),
            b'O' => Some(Self::Off),
            _ => None,
        }
    }

    /// Display name used in console replies
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Sine => "Sine",
            Self::Square => "Square",
            Self::Triangle => "Triangle",
            Self::Arbitrary => "Arbitrary",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for WaveType {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.name());
    }
}

/// Destination of received serial bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Bytes are command characters
    #[default]
    Command,
    /// Bytes are arbitrary-waveform sample data
    Load,
}

#[cfg(feature = "embedded")]
impl defmt::Format for InputMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Command => defmt::write!(f, "CMD"),
            Self::Load => defmt::write!(f, "LOAD"),
        }
    }
}

/// One full period of duty-cycle samples
pub type WaveformTable = [u16; WAVEFORM_SIZE];

/// Raw samples of an externally loaded waveform
pub type ArbitraryTable = [u16; WAVEFORM_SIZE];
