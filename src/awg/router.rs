//! Serial Byte Router
//!
//! Runs at interrupt priority on every received byte. It recovers from
//! line errors, tracks whether the link carries commands or waveform data,
//! and pushes each byte into the matching bounded FIFO without blocking.
//!
//! The input mode lives here and nowhere else: the router enters load mode
//! on the start byte and leaves it on the end byte, the reset byte, or after
//! forwarding the last sample of a full table. Load mode is only entered once
//! the loader's `Begin` marker is queued, so both sample counts restart
//! together.

use core::cell::RefCell;

use heapless::Deque;

use crate::awg::loader::{LoadSymbol, SampleFramer};
use crate::config::{LOAD_END_BYTE, LOAD_START_BYTE, RESET_BYTE, WAVEFORM_SIZE};
use crate::error::Fifo;
use crate::types::InputMode;

/// Receive error reported by the serial peripheral
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxError {
    /// Stop bit missing
    Framing,
    /// Parity mismatch
    Parity,
    /// Data register overwritten before it was read
    Overrun,
    /// Noise detected on the line
    Noise,
}

#[cfg(feature = "embedded")]
impl defmt::Format for RxError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RxError::Framing => defmt::write!(f, "framing"),
            RxError::Parity => defmt::write!(f, "parity"),
            RxError::Overrun => defmt::write!(f, "overrun"),
            RxError::Noise => defmt::write!(f, "noise"),
        }
    }
}

/// Non-blocking producer side of a bounded FIFO
pub trait Sink<T> {
    /// Enqueue `item`, handing it back if the FIFO is full
    ///
    /// # Errors
    ///
    /// Returns the item when there is no room.
    fn try_push(&self, item: T) -> Result<(), T>;
}

impl<T, const N: usize> Sink<T> for RefCell<Deque<T, N>> {
    fn try_push(&self, item: T) -> Result<(), T> {
        self.borrow_mut().push_back(item)
    }
}

#[cfg(feature = "embedded")]
impl<M, T, const N: usize> Sink<T> for embassy_sync::channel::Channel<M, T, N>
where
    M: embassy_sync::blocking_mutex::raw::RawMutex,
{
    fn try_push(&self, item: T) -> Result<(), T> {
        self.try_send(item).map_err(|e| match e {
            embassy_sync::channel::TrySendError::Full(item) => item,
        })
    }
}

/// What happened to one received byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routed {
    /// Byte enqueued
    Forwarded(Fifo),
    /// FIFO full, byte dropped
    Overflow(Fifo),
    /// Line error, byte discarded and error state cleared
    Discarded(RxError),
    /// Switched to load mode
    LoadStarted,
    /// Last sample of the table forwarded, back in command mode
    LoadComplete,
    /// End or reset byte received mid-transfer, back in command mode
    LoadAborted,
    /// Byte has no meaning in the current mode
    Ignored,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Routed {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Routed::Forwarded(fifo) => defmt::write!(f, "-> {}", fifo),
            Routed::Overflow(fifo) => defmt::write!(f, "overflow {}", fifo),
            Routed::Discarded(e) => defmt::write!(f, "discarded ({})", e),
            Routed::LoadStarted => defmt::write!(f, "load started"),
            Routed::LoadComplete => defmt::write!(f, "load complete"),
            Routed::LoadAborted => defmt::write!(f, "load aborted"),
            Routed::Ignored => defmt::write!(f, "ignored"),
        }
    }
}

/// Byte classifier and FIFO selector
#[derive(Debug, Default)]
pub struct Router {
    mode: InputMode,
    framer: SampleFramer,
    samples: usize,
}

impl Router {
    /// Create a router in command mode
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: InputMode::Command,
            framer: SampleFramer::new(),
            samples: 0,
        }
    }

    /// Current input mode
    #[must_use]
    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    /// Samples forwarded in the current transfer
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Route one received item. Never blocks.
    pub fn route<C, L>(&mut self, rx: Result<u8, RxError>, command: &C, load: &L) -> Routed
    where
        C: Sink<u8> + ?Sized,
        L: Sink<LoadSymbol> + ?Sized,
    {
        let byte = match rx {
            Ok(byte) => byte,
            Err(e) => return Routed::Discarded(e),
        };

        if byte.to_ascii_lowercase() == LOAD_START_BYTE {
            if load.try_push(LoadSymbol::Begin).is_err() {
                return Routed::Overflow(Fifo::Load);
            }
            self.mode = InputMode::Load;
            self.framer.reset();
            self.samples = 0;
            return Routed::LoadStarted;
        }

        if byte == LOAD_END_BYTE {
            return match self.mode {
                InputMode::Load => self.abort(),
                InputMode::Command => Routed::Ignored,
            };
        }

        if self.mode == InputMode::Load && byte.to_ascii_lowercase() == RESET_BYTE {
            // The interpreter still sees the reset and flushes the load FIFO
            let _ = command.try_push(byte);
            return self.abort();
        }

        match self.mode {
            InputMode::Command => match command.try_push(byte) {
                Ok(()) => Routed::Forwarded(Fifo::Command),
                Err(_) => Routed::Overflow(Fifo::Command),
            },
            InputMode::Load => {
                if load.try_push(LoadSymbol::Byte(byte)).is_err() {
                    return Routed::Overflow(Fifo::Load);
                }
                if self.framer.accept(byte) {
                    self.samples += 1;
                    if self.samples >= WAVEFORM_SIZE {
                        self.mode = InputMode::Command;
                        self.samples = 0;
                        return Routed::LoadComplete;
                    }
                }
                Routed::Forwarded(Fifo::Load)
            }
        }
    }

    fn abort(&mut self) -> Routed {
        self.mode = InputMode::Command;
        self.samples = 0;
        Routed::LoadAborted
    }
}
