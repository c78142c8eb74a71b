//! Wavetable Synthesis
//!
//! Fills one period of duty-cycle samples for each supported shape.
//! Every function writes the whole table in a single pass and produces
//! values in `0..=max_duty`, so rendering the same parameters twice yields
//! identical tables.

use core::f32::consts::PI;
#[cfg(feature = "embedded")]
use micromath::F32Ext;

use crate::config::{DUTY_MAX, MAX_AMPLITUDE_DV};
use crate::types::Amplitude;

/// Sine law used when filling the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SineMode {
    /// One full sine period across the whole table
    #[default]
    FullPeriod,
    /// Sine confined to two duty-scaled windows, mid-scale elsewhere
    DutyWindowed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SineMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::FullPeriod => defmt::write!(f, "full"),
            Self::DutyWindowed => defmt::write!(f, "windowed"),
        }
    }
}

/// Offset sine sample `round(h·sin(2π(i+1)/n) + h)` with `h = max/2`
fn sine_sample(i: usize, n: usize, max_duty: u16) -> u16 {
    let half = f32::from(max_duty) / 2.0;
    let angle = 2.0 * PI * (i + 1) as f32 / n as f32;
    let value = (half * angle.sin() + half).round();
    value.clamp(0.0, f32::from(max_duty)) as u16
}

/// Fill a sine table
///
/// `duty_index` only matters for [`SineMode::DutyWindowed`], where the sine
/// is emitted for `i < duty_index/2` and `n/2 < i < n/2 + duty_index/2`.
pub fn fill_sine(table: &mut [u16], max_duty: u16, mode: SineMode, duty_index: usize) {
    let n = table.len();
    match mode {
        SineMode::FullPeriod => {
            for (i, sample) in table.iter_mut().enumerate() {
                *sample = sine_sample(i, n, max_duty);
            }
        }
        SineMode::DutyWindowed => {
            let window = duty_index / 2;
            let baseline = max_duty / 2;
            for (i, sample) in table.iter_mut().enumerate() {
                let in_first = i < window;
                let in_second = i > n / 2 && i < n / 2 + window;
                *sample = if in_first || in_second {
                    sine_sample(i, n, max_duty)
                } else {
                    baseline
                };
            }
        }
    }
}

/// Fill a square table: `max_duty` below `duty_index`, zero after
pub fn fill_square(table: &mut [u16], max_duty: u16, duty_index: usize) {
    for (i, sample) in table.iter_mut().enumerate() {
        *sample = if i < duty_index { max_duty } else { 0 };
    }
}

/// Fill a triangle table rising over `[0, duty_index)` and falling after
///
/// At `duty_index == 0` the table is a single falling ramp starting at
/// `max_duty`; at `duty_index == n` it is a single rising ramp.
pub fn fill_triangle(table: &mut [u16], max_duty: u16, duty_index: usize) {
    let n = table.len();
    let max = max_duty as usize;

    if duty_index == 0 {
        for (i, sample) in table.iter_mut().enumerate() {
            *sample = (max - max * i / n) as u16;
        }
        return;
    }
    if duty_index >= n {
        for (i, sample) in table.iter_mut().enumerate() {
            *sample = (i * max / n) as u16;
        }
        return;
    }

    let fall_len = n - duty_index;
    for (i, sample) in table.iter_mut().enumerate() {
        *sample = if i < duty_index {
            (i * max / duty_index) as u16
        } else {
            (max - max * (i - duty_index) / fall_len) as u16
        };
    }
}

/// Rescale a loaded table by `amplitude / MAX_AMPLITUDE`
///
/// Source values above `DUTY_MAX` are clamped first.
pub fn fill_arbitrary(table: &mut [u16], source: &[u16], amplitude: Amplitude) {
    let amp = u32::from(amplitude.as_decivolts());
    for (sample, &raw) in table.iter_mut().zip(source.iter()) {
        let clamped = u32::from(raw.min(DUTY_MAX));
        *sample = (clamped * amp / u32::from(MAX_AMPLITUDE_DV)) as u16;
    }
}

/// Zero the table
pub fn fill_off(table: &mut [u16]) {
    table.fill(0);
}
