//! Waveform Generator Core
//!
//! State machines between the serial link and the PWM output. None of them
//! touch hardware directly: peripherals and FIFOs are reached through the
//! traits in [`crate::hal`] and [`router::Sink`], so everything here runs
//! unchanged on the host.
//!
//! ```text
//! UART rx ─► Router ─┬─► command FIFO ─► Interpreter ─► REGENERATE ─┐
//!                    └─► load FIFO ────► Loader ──► ARBITRARY_LOADED ┤
//!                                                                    ▼
//!                         TIM6 ISR ◄─ Streamer ◄─ publish ◄─ SynthesisEngine
//! ```

pub mod engine;
pub mod interpreter;
pub mod loader;
pub mod router;
pub mod state;
pub mod stream;

pub use engine::{stop_stream, SynthesisEngine};
pub use interpreter::{Action, Applied, Interpreter};
pub use loader::{LoadProgress, LoadSymbol, SampleFramer, WaveformLoader};
pub use router::{Routed, Router, RxError, Sink};
pub use state::{apply_command, WaveParameters};
pub use stream::{in_trigger_window, StreamProgram, StreamSink, Streamer};
