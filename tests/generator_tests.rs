//! Generator Tests
//!
//! Interpreter, synthesis engine and streamer wired together over host
//! mocks of the sample clock, PWM output and trigger pin.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test generator_tests

use awg_firmware::awg::engine::{stop_stream, SynthesisEngine};
use awg_firmware::awg::interpreter::{Action, Interpreter};
use awg_firmware::awg::state::WaveParameters;
use awg_firmware::awg::stream::{in_trigger_window, StreamProgram, StreamSink, Streamer};
use awg_firmware::config::{DUTY_MAX, SYSTEM_CLOCK_HZ, TRIGGER_WIDTH, WAVEFORM_SIZE};
use awg_firmware::dsp::wavetable::SineMode;
use awg_firmware::error::AwgError;
use awg_firmware::hal::gpio::TriggerOutput;
use awg_firmware::hal::pwm::{DutyCycle, PwmOutput};
use awg_firmware::hal::timer::{ClockError, SampleClock, TimerSetting};
use awg_firmware::protocol::Reply;
use awg_firmware::types::{Amplitude, Frequency, WaveType};

// =============================================================================
// Mocks
// =============================================================================

#[derive(Default)]
struct MockClock {
    rate_hz: Option<u32>,
    running: bool,
    interrupt: bool,
    cleared: usize,
}

impl SampleClock for MockClock {
    fn configure(&mut self, rate_hz: u32) -> Result<TimerSetting, ClockError> {
        self.running = false;
        self.interrupt = false;
        let setting = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, rate_hz)?;
        self.rate_hz = Some(rate_hz);
        Ok(setting)
    }

    fn set_interrupt(&mut self, enable: bool) {
        self.interrupt = enable;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn clear_interrupt(&mut self) {
        self.cleared += 1;
    }
}

#[derive(Default)]
struct MockPwm {
    duties: Vec<u16>,
}

impl PwmOutput for MockPwm {
    fn set_duty(&mut self, duty: DutyCycle) {
        self.duties.push(duty.raw());
    }
}

#[derive(Default)]
struct MockTrigger {
    levels: Vec<bool>,
}

impl TriggerOutput for MockTrigger {
    fn set_active(&mut self, active: bool) {
        self.levels.push(active);
    }
}

/// Everything between the command FIFO and the pins
struct Generator {
    interpreter: Interpreter,
    engine: SynthesisEngine,
    clock: MockClock,
    stream: Streamer<MockPwm, MockTrigger>,
    replies: Vec<Reply>,
    outcomes: Vec<Result<Option<TimerSetting>, AwgError>>,
}

impl Generator {
    fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            engine: SynthesisEngine::new(SineMode::FullPeriod),
            clock: MockClock::default(),
            stream: Streamer::new(MockPwm::default(), MockTrigger::default()),
            replies: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Same sequencing as the interpreter and engine tasks
    fn send(&mut self, line: &[u8]) {
        for &b in line {
            let action = self.interpreter.feed(b);
            if let Action::Apply(applied) = action {
                stop_stream(&mut self.clock, &mut self.stream);
                self.replies.push(applied.reply);
                let outcome = self.engine.apply(applied.params, &mut self.clock, &mut self.stream);
                self.outcomes.push(outcome);
            }
        }
    }

    fn tick(&mut self, n: usize) -> Vec<usize> {
        (0..n).map(|_| self.stream.tick()).collect()
    }
}

fn expected_sine(i: usize) -> u16 {
    let h = f64::from(DUTY_MAX) / 2.0;
    let angle = 2.0 * std::f64::consts::PI * (i + 1) as f64 / WAVEFORM_SIZE as f64;
    (h * angle.sin() + h).round() as u16
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn amplitude_frequency_sine_streams_at_40khz() {
    let mut awg = Generator::new();
    awg.send(b"V33\r");
    awg.send(b"F100\r");
    awg.send(b"S\r");

    assert_eq!(
        awg.replies,
        vec![
            Reply::Amplitude(Amplitude::FULL),
            Reply::Frequency(Frequency::from_hz(100).unwrap()),
            Reply::Wave(WaveType::Sine),
        ]
    );

    // Clock programmed for N * 100 Hz and running
    let last = awg.outcomes.last().unwrap().unwrap().unwrap();
    assert_eq!(last.actual_hz(SYSTEM_CLOCK_HZ), 40_000);
    assert_eq!(awg.clock.rate_hz, Some(40_000));
    assert!(awg.clock.running);
    assert!(awg.clock.interrupt);

    // Published table is one sine period at full scale
    let table = awg.stream.program().table;
    for (i, &s) in table.iter().enumerate() {
        assert!(s.abs_diff(expected_sine(i)) <= 1, "i={i}");
    }

    // Index cycles 0..399 repeatedly
    let indices = awg.tick(2 * WAVEFORM_SIZE + 5);
    for (k, &idx) in indices.iter().enumerate() {
        assert_eq!(idx, k % WAVEFORM_SIZE);
    }
    // PWM follows the table
    let duties = &awg.stream.pwm().duties;
    let streamed = &duties[duties.len() - indices.len()..];
    assert_eq!(&streamed[..WAVEFORM_SIZE], &table[..]);
}

#[test]
fn zero_frequency_reports_configuration_error() {
    let mut awg = Generator::new();
    awg.send(b"V33\r");
    awg.send(b"S\r");

    assert_eq!(
        awg.outcomes.last(),
        Some(&Err(AwgError::Configuration(ClockError::ZeroFrequency)))
    );
    assert!(!awg.clock.running);
}

#[test]
fn off_leaves_clock_stopped() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF100\rQ\r");
    assert!(awg.clock.running);

    awg.send(b"F000\r");
    assert_eq!(awg.replies.last(), Some(&Reply::Wave(WaveType::Off)));
    assert_eq!(awg.outcomes.last(), Some(&Ok(None)));
    assert!(!awg.clock.running);
    assert!(awg.stream.program().table.iter().all(|&s| s == 0));
    // Frequency kept for the next wave selection
    assert_eq!(awg.interpreter.params().frequency.as_hz(), 100);
}

#[test]
fn invalid_operand_still_restarts_with_old_parameters() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF100\rQ\r");
    let before = awg.stream.program().clone();

    awg.send(b"F999\r");
    assert!(matches!(awg.outcomes.last(), Some(Ok(Some(_)))));
    assert_eq!(awg.stream.program(), &before);
    assert_eq!(awg.clock.rate_hz, Some(40_000));
}

#[test]
fn unknown_command_does_not_stop_stream() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF100\rS\r");
    let applied = awg.outcomes.len();

    awg.send(b"X\r");
    assert_eq!(awg.outcomes.len(), applied);
    assert!(awg.clock.running);
}

#[test]
fn square_duty_changes_table() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF010\rD025\rQ\r");

    let table = &awg.stream.program().table;
    let high = table.iter().filter(|&&s| s == DUTY_MAX).count();
    assert_eq!(high, 100);
}

// =============================================================================
// Stop / Halt Tests
// =============================================================================

#[test]
fn stop_stream_parks_output() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF100\rQ\r");
    awg.tick(3);

    stop_stream(&mut awg.clock, &mut awg.stream);
    assert!(!awg.clock.running);
    assert!(!awg.clock.interrupt);
    assert_eq!(awg.stream.pwm().duties.last(), Some(&0));
    assert_eq!(awg.stream.trigger().levels.last(), Some(&false));
}

#[test]
fn publish_restarts_at_index_zero() {
    let mut stream = Streamer::new(MockPwm::default(), MockTrigger::default());
    for _ in 0..17 {
        stream.tick();
    }
    assert_eq!(stream.index(), 17);

    stream.publish(&StreamProgram::silent());
    assert_eq!(stream.index(), 0);
}

// =============================================================================
// Arbitrary Waveform Tests
// =============================================================================

#[test]
fn arbitrary_load_reapplies_when_selected() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF050\rA\r");

    let mut table = [0u16; WAVEFORM_SIZE];
    for (i, s) in table.iter_mut().enumerate() {
        *s = (i % 200) as u16;
    }
    let outcome = awg
        .engine
        .load_arbitrary(&table, &mut awg.clock, &mut awg.stream);

    assert!(matches!(outcome, Ok(Some(_))));
    assert_eq!(awg.stream.program().table, table);
    assert!(awg.clock.running);
}

#[test]
fn arbitrary_load_waits_for_selection() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF050\rS\r");
    let sine = awg.stream.program().clone();

    let table = [100u16; WAVEFORM_SIZE];
    let outcome = awg
        .engine
        .load_arbitrary(&table, &mut awg.clock, &mut awg.stream);
    assert_eq!(outcome, Ok(None));
    assert_eq!(awg.stream.program(), &sine);
    // Old waveform keeps streaming through the transfer
    assert!(awg.clock.running);

    awg.send(b"A\r");
    assert!(awg.stream.program().table.iter().all(|&s| s == 100));
}

// =============================================================================
// Trigger Tests
// =============================================================================

#[test]
fn trigger_window_at_phase_zero() {
    assert!(in_trigger_window(0, 0));
    assert!(in_trigger_window(TRIGGER_WIDTH, 0));
    assert!(!in_trigger_window(TRIGGER_WIDTH + 1, 0));
    assert!(!in_trigger_window(WAVEFORM_SIZE - 1, 0));
}

#[test]
fn trigger_window_wraps() {
    let phase_index = WAVEFORM_SIZE - 5;
    assert!(!in_trigger_window(phase_index - 1, phase_index));
    assert!(in_trigger_window(phase_index, phase_index));
    assert!(in_trigger_window(0, phase_index));
    assert!(in_trigger_window(TRIGGER_WIDTH - 5, phase_index));
    assert!(!in_trigger_window(TRIGGER_WIDTH - 4, phase_index));
}

#[test]
fn trigger_follows_phase_command() {
    let mut awg = Generator::new();
    awg.send(b"V33\rF100\rP090\rS\r");
    assert_eq!(awg.stream.program().phase_index, 100);

    awg.tick(WAVEFORM_SIZE);
    let levels = &awg.stream.trigger().levels;
    let period = &levels[levels.len() - WAVEFORM_SIZE..];

    let high: Vec<usize> = period
        .iter()
        .enumerate()
        .filter_map(|(i, &on)| on.then_some(i))
        .collect();
    assert_eq!(high.len(), TRIGGER_WIDTH + 1);
    assert_eq!(high.first(), Some(&100));
    assert_eq!(high.last(), Some(&(100 + TRIGGER_WIDTH)));
}

#[test]
fn engine_starts_idle() {
    let engine = SynthesisEngine::default();
    assert_eq!(*engine.params(), WaveParameters::new());
    assert!(engine.program().table.iter().all(|&s| s == 0));
    assert!(engine.arbitrary().iter().all(|&s| s == 0));
}
