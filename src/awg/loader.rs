//! Arbitrary Waveform Loader
//!
//! Decodes an arbitrary waveform sent as ASCII-decimal lines, one sample per
//! line. Input is trusted: values are not range-checked here (synthesis
//! clamps them) and stray bytes are skipped.

use crate::config::WAVEFORM_SIZE;
use crate::types::ArbitraryTable;

/// Item carried by the load FIFO
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSymbol {
    /// A new transfer begins; restart at sample 0
    Begin,
    /// Raw byte of sample data
    Byte(u8),
}

#[cfg(feature = "embedded")]
impl defmt::Format for LoadSymbol {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Begin => defmt::write!(f, "Begin"),
            Self::Byte(b) => defmt::write!(f, "Byte({=u8:#x})", b),
        }
    }
}

/// Sample boundary detector
///
/// A sample ends at the first CR or LF after at least one digit, so CRLF,
/// LF and CR line endings all count once. The router and the loader run
/// the same framer over the same bytes and therefore agree on when a
/// transfer is complete.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleFramer {
    digits_pending: bool,
}

impl SampleFramer {
    /// Create a framer at a sample boundary
    #[must_use]
    pub const fn new() -> Self {
        Self {
            digits_pending: false,
        }
    }

    /// Forget any partial sample
    pub fn reset(&mut self) {
        self.digits_pending = false;
    }

    /// Returns true when `byte` terminates a sample
    pub fn accept(&mut self, byte: u8) -> bool {
        if byte.is_ascii_digit() {
            self.digits_pending = true;
            false
        } else if (byte == b'\r' || byte == b'\n') && self.digits_pending {
            self.digits_pending = false;
            true
        } else {
            false
        }
    }
}

/// Loader progress after one symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadProgress {
    /// Transfer restarted at sample 0
    Started,
    /// Byte consumed, table not yet full
    Pending,
    /// A sample was committed at this index
    Stored(usize),
    /// The last sample was committed; [`WaveformLoader::table`] is complete
    Complete,
}

/// Arbitrary waveform decoder
pub struct WaveformLoader {
    table: ArbitraryTable,
    index: usize,
    value: u32,
    framer: SampleFramer,
}

impl WaveformLoader {
    /// Create an empty loader
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: [0; WAVEFORM_SIZE],
            index: 0,
            value: 0,
            framer: SampleFramer::new(),
        }
    }

    /// Index of the next sample to be written
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Samples received so far (complete once `Complete` was reported)
    #[must_use]
    pub const fn table(&self) -> &ArbitraryTable {
        &self.table
    }

    /// Consume one symbol from the load FIFO
    pub fn feed(&mut self, symbol: LoadSymbol) -> LoadProgress {
        let byte = match symbol {
            LoadSymbol::Begin => {
                self.restart();
                return LoadProgress::Started;
            }
            LoadSymbol::Byte(b) => b,
        };

        if byte.is_ascii_digit() {
            self.value = self
                .value
                .saturating_mul(10)
                .saturating_add(u32::from(byte - b'0'));
        }

        if !self.framer.accept(byte) {
            return LoadProgress::Pending;
        }

        let stored_at = self.index;
        self.table[stored_at] = u16::try_from(self.value).unwrap_or(u16::MAX);
        self.value = 0;
        self.index += 1;

        if self.index >= WAVEFORM_SIZE {
            self.index = 0;
            LoadProgress::Complete
        } else {
            LoadProgress::Stored(stored_at)
        }
    }

    fn restart(&mut self) {
        self.index = 0;
        self.value = 0;
        self.framer.reset();
    }
}

impl Default for WaveformLoader {
    fn default() -> Self {
        Self::new()
    }
}
