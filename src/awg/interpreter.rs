//! Command Interpreter
//!
//! Byte-at-a-time state machine that builds a command line, parses it on
//! CR/LF and applies it to the owned [`WaveParameters`]. The interpreter
//! performs no I/O; each byte yields an [`Action`] the caller carries out
//! (echo, stop streaming, notify the engine, print a reply).

use heapless::Vec;

use crate::awg::state::WaveParameters;
use crate::config::{INPUT_BUFFER_SIZE, RESET_BYTE};
use crate::error::{AwgError, Fifo};
use crate::protocol::{parse_line, Reply};

/// Result of applying a recognised command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Confirmation or validation error to print
    pub reply: Reply,
    /// Parameter snapshot the engine must regenerate from
    pub params: WaveParameters,
}

/// What the caller must do after feeding one byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do
    Idle,
    /// Echo the byte back to the terminal
    Echo(u8),
    /// Input was reset; drop pending load bytes and print a blank line
    Reset,
    /// Line buffer overflowed on this byte and was cleared
    Overflow(u8),
    /// Line did not start with a known command letter
    Invalid,
    /// Stop streaming, print the reply, send the snapshot to the engine
    Apply(Applied),
}

impl Action {
    /// Console reply for this action, if any
    #[must_use]
    pub const fn reply(&self) -> Option<Reply> {
        match self {
            Action::Idle => None,
            Action::Echo(b) => Some(Reply::Echo(*b)),
            Action::Reset => Some(Reply::NewLine),
            Action::Overflow(_) => Some(Reply::Error(AwgError::Overflow(Fifo::LineBuffer))),
            Action::Invalid => Some(Reply::InvalidCommand),
            Action::Apply(applied) => Some(applied.reply),
        }
    }

    /// All console replies for this action, in print order
    ///
    /// An overflow echoes the offending byte before the error.
    pub fn replies(&self) -> impl Iterator<Item = Reply> {
        let echo = match self {
            Action::Overflow(b) => Some(Reply::Echo(*b)),
            _ => None,
        };
        echo.into_iter().chain(self.reply())
    }
}

/// Line-accumulating command interpreter
pub struct Interpreter {
    buffer: Vec<u8, INPUT_BUFFER_SIZE>,
    params: WaveParameters,
}

impl Interpreter {
    /// Create an interpreter with power-up parameters
    #[must_use]
    pub const fn new() -> Self {
        Self::with_params(WaveParameters::new())
    }

    /// Create an interpreter starting from the given parameters
    #[must_use]
    pub const fn with_params(params: WaveParameters) -> Self {
        Self {
            buffer: Vec::new(),
            params,
        }
    }

    /// Current parameters
    #[must_use]
    pub const fn params(&self) -> &WaveParameters {
        &self.params
    }

    /// Bytes accumulated for the current line
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Feed one byte received from the command FIFO
    pub fn feed(&mut self, byte: u8) -> Action {
        if byte.to_ascii_lowercase() == RESET_BYTE {
            self.buffer.clear();
            return Action::Reset;
        }

        if byte.is_ascii_alphanumeric() {
            // Capacity is INPUT_BUFFER_SIZE, the overflow check below keeps
            // us one short of it
            let _ = self.buffer.push(byte);
            if self.buffer.len() >= INPUT_BUFFER_SIZE - 1 {
                self.buffer.clear();
                return Action::Overflow(byte);
            }
            return Action::Echo(byte);
        }

        if byte == b'\r' || byte == b'\n' {
            return self.end_line();
        }

        Action::Idle
    }

    fn end_line(&mut self) -> Action {
        if self.buffer.is_empty() {
            return Action::Idle;
        }

        let parsed = parse_line(&self.buffer);
        self.buffer.clear();

        match parsed {
            Some(command) => {
                let reply = self.params.apply(command);
                Action::Apply(Applied {
                    reply,
                    params: self.params,
                })
            }
            None => Action::Invalid,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
