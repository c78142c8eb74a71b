//! Communication Protocols
//!
//! Serial command parsing and console reply formatting.
//!
//! A command line is one letter, optionally followed by a fixed-width
//! decimal operand, terminated by CR or LF:
//!
//! ```text
//! Fddd  frequency 000-300 Hz       S  sine
//! Vdd   amplitude 00-33 (x0.1 V)   T  triangle
//! Pddd  phase 000-360 deg          Q  square
//! Dddd  duty 000-100 %             A  arbitrary
//! R     reset input                O  off
//! ```
//!
//! Letters are case-insensitive. `l` starts an arbitrary-waveform load and
//! is handled by the router, not here.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::CONSOLE_LINE_SIZE;
use crate::error::AwgError;
use crate::types::{Amplitude, DutyPercent, Frequency, Phase, WaveType};

/// Start-up menu printed once the serial link is up
pub const BANNER: &[&str] = &[
    "Arbitrary Waveform Generator",
    "Commands:",
    "s (sine); t (triangle); q (square); a (arbitrary); o (off)",
    "Frequency: Fxxx -> 000-300",
    "Amplitude: Vxx -> 00-33",
    "Phase: Pxxx -> 000-360",
    "Duty: Dxxx -> 000-100",
    "Load waveform: l, then 400 decimal lines",
];

/// Command parsed from one input line
///
/// Numeric operands are carried unvalidated; `None` marks a missing or
/// non-decimal operand. Range checks happen when the command is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Select the output shape
    SelectWave(WaveType),
    /// Set frequency in Hz
    SetFrequency(Option<u16>),
    /// Set amplitude in tenths of a volt
    SetAmplitude(Option<u16>),
    /// Set trigger phase in degrees
    SetPhase(Option<u16>),
    /// Set duty cycle in percent
    SetDuty(Option<u16>),
}

#[cfg(feature = "embedded")]
impl defmt::Format for Command {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::SelectWave(w) => defmt::write!(f, "Wave({})", w),
            Self::SetFrequency(v) => defmt::write!(f, "F({})", v),
            Self::SetAmplitude(v) => defmt::write!(f, "V({})", v),
            Self::SetPhase(v) => defmt::write!(f, "P({})", v),
            Self::SetDuty(v) => defmt::write!(f, "D({})", v),
        }
    }
}

/// Read `digits` ASCII decimal digits starting at byte 1
fn operand(line: &[u8], digits: usize) -> Option<u16> {
    let field = line.get(1..=digits)?;
    field.iter().try_fold(0u16, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u16::from(b - b'0'))
    })
}

/// Parse a complete line (terminator already stripped)
///
/// Returns `None` for an empty line or an unknown command letter.
#[must_use]
pub fn parse_line(line: &[u8]) -> Option<Command> {
    let letter = *line.first()?;

    if let Some(wave) = WaveType::from_letter(letter) {
        return Some(Command::SelectWave(wave));
    }

    match letter.to_ascii_uppercase() {
        b'F' => Some(Command::SetFrequency(operand(line, 3))),
        b'V' => Some(Command::SetAmplitude(operand(line, 2))),
        b'P' => Some(Command::SetPhase(operand(line, 3))),
        b'D' => Some(Command::SetDuty(operand(line, 3))),
        _ => None,
    }
}

/// Message sent back over the serial link
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Echo of an accepted input character
    Echo(u8),
    /// Blank line after an input reset
    NewLine,
    /// Wave type changed
    Wave(WaveType),
    /// Frequency accepted
    Frequency(Frequency),
    /// Amplitude accepted
    Amplitude(Amplitude),
    /// Phase accepted
    Phase(Phase),
    /// Duty cycle accepted
    Duty(DutyPercent),
    /// Unknown command letter
    InvalidCommand,
    /// Arbitrary-waveform transfer started
    LoadStarted,
    /// All samples of an arbitrary waveform received
    LoadComplete,
    /// Transfer ended before the table was full
    LoadAborted,
    /// Recoverable error
    Error(AwgError),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Echo(b) => write!(f, "{}", char::from(*b)),
            Reply::NewLine => Ok(()),
            Reply::Wave(w) => write!(f, "Wave: {}", w.name()),
            Reply::Frequency(freq) => write!(f, "Freq: {} Hz", freq.as_hz()),
            Reply::Amplitude(amp) => write!(f, "Amp: {amp}"),
            Reply::Phase(p) => write!(f, "Phase: {} Deg", p.as_degrees()),
            Reply::Duty(d) => write!(f, "Duty: {} %", d.as_percent()),
            Reply::InvalidCommand => write!(f, "Invalid command."),
            Reply::LoadStarted => write!(f, "Loading waveform..."),
            Reply::LoadComplete => write!(f, "Waveform loaded."),
            Reply::LoadAborted => write!(f, "Waveform load aborted."),
            Reply::Error(e) => write!(f, "{e}"),
        }
    }
}

/// Console line formatter
///
/// Echoes go out bare; every other reply becomes `\r<text>\n` so it starts
/// at column 0 of a fresh terminal line.
pub struct ReplyFormatter {
    buffer: String<CONSOLE_LINE_SIZE>,
}

impl ReplyFormatter {
    /// Create a new formatter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Format a reply into the internal buffer
    pub fn format(&mut self, reply: &Reply) -> &str {
        self.buffer.clear();
        let _ = match reply {
            Reply::Echo(_) => write!(self.buffer, "{reply}"),
            Reply::NewLine => self.buffer.push_str("\r\n").map_err(|()| fmt::Error),
            _ => write!(self.buffer, "\r{reply}\n"),
        };
        &self.buffer
    }

    /// Format a banner line
    pub fn line(&mut self, text: &str) -> &str {
        self.buffer.clear();
        let _ = write!(self.buffer, "\r{text}\n");
        &self.buffer
    }

    /// Get the formatted bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }
}

impl Default for ReplyFormatter {
    fn default() -> Self {
        Self::new()
    }
}
