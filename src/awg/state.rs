//! Generator Parameters
//!
//! The parameter set owned by the command interpreter. Commands are applied
//! through [`WaveParameters::apply`], which validates the operand and either
//! updates exactly one field or leaves the state untouched.

use crate::error::{AwgError, Field};
use crate::protocol::{Command, Reply};
use crate::types::{Amplitude, DutyPercent, Frequency, Phase, WaveType};

/// Complete set of user-controlled generator parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveParameters {
    /// Output shape
    pub wave: WaveType,
    /// Output frequency
    pub frequency: Frequency,
    /// Output amplitude
    pub amplitude: Amplitude,
    /// Trigger phase
    pub phase: Phase,
    /// Duty cycle of square and triangle shapes
    pub duty: DutyPercent,
}

impl WaveParameters {
    /// Power-up parameters: output off, 0 Hz, 0.0 V, 0 deg, 50 %
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wave: WaveType::Off,
            frequency: Frequency::ZERO,
            amplitude: Amplitude::ZERO,
            phase: Phase::ZERO,
            duty: DutyPercent::DEFAULT,
        }
    }

    /// Duty-cycle ceiling for the current amplitude
    #[must_use]
    pub const fn max_duty(&self) -> u16 {
        self.amplitude.max_duty()
    }

    /// Set wave type (returns new state)
    #[must_use]
    pub const fn with_wave(self, wave: WaveType) -> Self {
        Self { wave, ..self }
    }

    /// Set frequency (returns new state)
    #[must_use]
    pub const fn with_frequency(self, frequency: Frequency) -> Self {
        Self { frequency, ..self }
    }

    /// Set amplitude (returns new state)
    #[must_use]
    pub const fn with_amplitude(self, amplitude: Amplitude) -> Self {
        Self { amplitude, ..self }
    }

    /// Set phase (returns new state)
    #[must_use]
    pub const fn with_phase(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Set duty cycle (returns new state)
    #[must_use]
    pub const fn with_duty(self, duty: DutyPercent) -> Self {
        Self { duty, ..self }
    }

    /// Apply a parsed command and describe the outcome
    ///
    /// A zero frequency or amplitude switches the output off without
    /// touching the stored value. Any other out-of-range operand is
    /// rejected and the state is left as it was.
    pub fn apply(&mut self, command: Command) -> Reply {
        let (next, reply) = apply_command(*self, command);
        *self = next;
        reply
    }
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for WaveParameters {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} {} {} {} {}",
            self.wave,
            self.frequency,
            self.amplitude,
            self.phase,
            self.duty
        );
    }
}

fn rejected(state: WaveParameters, field: Field) -> (WaveParameters, Reply) {
    (state, Reply::Error(AwgError::Validation(field)))
}

fn switched_off(state: WaveParameters) -> (WaveParameters, Reply) {
    (state.with_wave(WaveType::Off), Reply::Wave(WaveType::Off))
}

/// Pure state transition for one command
#[must_use]
pub fn apply_command(state: WaveParameters, command: Command) -> (WaveParameters, Reply) {
    match command {
        Command::SelectWave(wave) => (state.with_wave(wave), Reply::Wave(wave)),

        Command::SetFrequency(Some(0)) => switched_off(state),
        Command::SetFrequency(hz) => match hz.and_then(Frequency::from_hz) {
            Some(freq) => (state.with_frequency(freq), Reply::Frequency(freq)),
            None => rejected(state, Field::Frequency),
        },

        Command::SetAmplitude(Some(0)) => switched_off(state),
        Command::SetAmplitude(dv) => {
            let amp = dv
                .and_then(|v| u8::try_from(v).ok())
                .and_then(Amplitude::from_decivolts);
            match amp {
                Some(amp) => (state.with_amplitude(amp), Reply::Amplitude(amp)),
                None => rejected(state, Field::Amplitude),
            }
        }

        Command::SetPhase(deg) => match deg.and_then(Phase::from_degrees) {
            Some(phase) => (state.with_phase(phase), Reply::Phase(phase)),
            None => rejected(state, Field::Phase),
        },

        Command::SetDuty(pct) => {
            let duty = pct
                .and_then(|v| u8::try_from(v).ok())
                .and_then(DutyPercent::from_percent);
            match duty {
                Some(duty) => (state.with_duty(duty), Reply::Duty(duty)),
                None => rejected(state, Field::Duty),
            }
        }
    }
}
