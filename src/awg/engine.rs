//! Waveform Synthesis Engine
//!
//! Turns a parameter snapshot into a [`StreamProgram`], hands it to the
//! streamer and (re)starts the sample clock at `WAVEFORM_SIZE × frequency`.
//! The engine renders into its own buffer and publishes the finished
//! program in one step; it never writes a table the streamer is reading.

use crate::awg::state::WaveParameters;
use crate::awg::stream::{StreamProgram, StreamSink};
use crate::config::WAVEFORM_SIZE;
use crate::dsp::wavetable::{
    fill_arbitrary, fill_off, fill_sine, fill_square, fill_triangle, SineMode,
};
use crate::error::AwgError;
use crate::hal::timer::{SampleClock, TimerSetting};
use crate::types::{ArbitraryTable, WaveType};

/// Stop streaming: halt the sample clock and park the output at 0%
pub fn stop_stream<C, S>(clock: &mut C, sink: &mut S)
where
    C: SampleClock + ?Sized,
    S: StreamSink + ?Sized,
{
    clock.stop();
    clock.set_interrupt(false);
    sink.halt();
}

/// Table synthesizer and sample-clock controller
pub struct SynthesisEngine {
    sine_mode: SineMode,
    params: WaveParameters,
    arbitrary: ArbitraryTable,
    program: StreamProgram,
}

impl SynthesisEngine {
    /// Create an engine with an empty arbitrary table
    #[must_use]
    pub const fn new(sine_mode: SineMode) -> Self {
        Self {
            sine_mode,
            params: WaveParameters::new(),
            arbitrary: [0; WAVEFORM_SIZE],
            program: StreamProgram::silent(),
        }
    }

    /// Parameters of the last applied snapshot
    #[must_use]
    pub const fn params(&self) -> &WaveParameters {
        &self.params
    }

    /// Last rendered program
    #[must_use]
    pub const fn program(&self) -> &StreamProgram {
        &self.program
    }

    /// Loaded arbitrary waveform
    #[must_use]
    pub const fn arbitrary(&self) -> &ArbitraryTable {
        &self.arbitrary
    }

    /// Render one period for `params` into the engine's buffer
    pub fn render(&mut self, params: &WaveParameters) -> &StreamProgram {
        let table = &mut self.program.table;
        let max_duty = params.max_duty();
        let duty_index = params.duty.index();

        match params.wave {
            WaveType::Sine => fill_sine(table, max_duty, self.sine_mode, duty_index),
            WaveType::Square => fill_square(table, max_duty, duty_index),
            WaveType::Triangle => fill_triangle(table, max_duty, duty_index),
            WaveType::Arbitrary => fill_arbitrary(table, &self.arbitrary, params.amplitude),
            WaveType::Off => fill_off(table),
        }
        self.program.phase_index = params.phase.index();

        &self.program
    }

    /// Regenerate from a new snapshot, publish it and start the sample clock
    ///
    /// Returns the programmed timer setting, or `None` when the snapshot
    /// selects [`WaveType::Off`]: the silent program is published and the
    /// clock is left stopped.
    ///
    /// # Errors
    ///
    /// Returns [`AwgError::Configuration`] when the sample clock cannot run
    /// at the required rate. The program is still published but the clock
    /// stays stopped.
    pub fn apply<C, S>(
        &mut self,
        params: WaveParameters,
        clock: &mut C,
        sink: &mut S,
    ) -> Result<Option<TimerSetting>, AwgError>
    where
        C: SampleClock + ?Sized,
        S: StreamSink + ?Sized,
    {
        self.params = params;
        self.render(&params);

        clock.stop();
        sink.publish(&self.program);

        if params.wave == WaveType::Off {
            stop_stream(clock, sink);
            return Ok(None);
        }

        let setting = clock.configure(params.frequency.sample_rate())?;
        clock.set_interrupt(true);
        clock.start();
        Ok(Some(setting))
    }

    /// Store a freshly loaded arbitrary waveform
    ///
    /// If the arbitrary shape is selected the output is regenerated at once;
    /// otherwise the table waits for the next `A` command and `Ok(None)` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Same as [`SynthesisEngine::apply`].
    pub fn load_arbitrary<C, S>(
        &mut self,
        table: &ArbitraryTable,
        clock: &mut C,
        sink: &mut S,
    ) -> Result<Option<TimerSetting>, AwgError>
    where
        C: SampleClock + ?Sized,
        S: StreamSink + ?Sized,
    {
        self.arbitrary.copy_from_slice(table);
        if self.params.wave == WaveType::Arbitrary {
            self.apply(self.params, clock, sink)
        } else {
            Ok(None)
        }
    }
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new(SineMode::default())
    }
}
