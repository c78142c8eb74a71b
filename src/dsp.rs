//! Digital Signal Processing
//!
//! Table synthesis for the supported waveform shapes.

pub mod wavetable;
