//! Sample Streaming
//!
//! Per-tick state machine run from the sample-clock interrupt. Each tick
//! writes one table entry to the PWM output, drives the trigger marker and
//! advances the sample index modulo the table size. A tick does a fixed
//! amount of work and never blocks.

use crate::config::{TRIGGER_WIDTH, WAVEFORM_SIZE};
use crate::hal::gpio::TriggerOutput;
use crate::hal::pwm::{DutyCycle, PwmOutput};
use crate::types::WaveformTable;

/// Immutable snapshot handed from the engine to the streamer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamProgram {
    /// One period of duty samples
    pub table: WaveformTable,
    /// First table index of the trigger window
    pub phase_index: usize,
}

impl StreamProgram {
    /// All-zero table with the trigger at index 0
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            table: [0; WAVEFORM_SIZE],
            phase_index: 0,
        }
    }
}

impl Default for StreamProgram {
    fn default() -> Self {
        Self::silent()
    }
}

/// Destination for finished programs
///
/// Implementations replace the whole table at once, so a tick never sees a
/// mix of the old and new period.
pub trait StreamSink {
    /// Install a new program and restart at index 0
    fn publish(&mut self, program: &StreamProgram);

    /// Drive the output to 0% duty and release the trigger
    fn halt(&mut self);
}

/// True when `index` lies in `[phase_index, phase_index + TRIGGER_WIDTH]`,
/// wrapping past the end of the table
#[must_use]
pub const fn in_trigger_window(index: usize, phase_index: usize) -> bool {
    let offset = (index + WAVEFORM_SIZE - phase_index % WAVEFORM_SIZE) % WAVEFORM_SIZE;
    offset <= TRIGGER_WIDTH
}

/// Sample streamer driving the PWM output and trigger marker
pub struct Streamer<P, T> {
    pwm: P,
    trigger: T,
    program: StreamProgram,
    index: usize,
}

impl<P: PwmOutput, T: TriggerOutput> Streamer<P, T> {
    /// Create a streamer playing silence
    pub fn new(pwm: P, trigger: T) -> Self {
        Self {
            pwm,
            trigger,
            program: StreamProgram::silent(),
            index: 0,
        }
    }

    /// Emit the current sample and advance. Returns the index just emitted.
    pub fn tick(&mut self) -> usize {
        let index = self.index;

        self.pwm
            .set_duty(DutyCycle::from_raw(self.program.table[index]));
        self.trigger
            .set_active(in_trigger_window(index, self.program.phase_index));

        self.index = (index + 1) % WAVEFORM_SIZE;
        index
    }

    /// Index of the next sample to emit
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Program currently playing
    #[must_use]
    pub const fn program(&self) -> &StreamProgram {
        &self.program
    }

    /// PWM output
    #[must_use]
    pub const fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Trigger output
    #[must_use]
    pub const fn trigger(&self) -> &T {
        &self.trigger
    }
}

impl<P: PwmOutput, T: TriggerOutput> StreamSink for Streamer<P, T> {
    fn publish(&mut self, program: &StreamProgram) {
        self.program.clone_from(program);
        self.index = 0;
    }

    fn halt(&mut self) {
        self.pwm.set_duty(DutyCycle::ZERO);
        self.trigger.set_active(false);
    }
}
