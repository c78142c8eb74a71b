//! Application Wiring
//!
//! Static queues, shared peripherals and the task bodies connecting them.
//! `main.rs` owns the executors and the peripheral singletons; each task it
//! spawns is a thin `#[embassy_executor::task]` around a function here.
//!
//! The router is the only producer of the command and load FIFOs and runs
//! on the interrupt executor. Everything else runs in thread mode. The
//! sample clock and the streamer are shared with the TIM6 interrupt and
//! are only touched inside a critical section.

use core::cell::RefCell;

use defmt::{debug, error, info, trace, warn};
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::Output;
use embassy_stm32::usart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embedded_io_async::{Read, Write};

use crate::awg::{
    stop_stream, Action, Interpreter, LoadProgress, LoadSymbol, Routed, Router, StreamProgram,
    StreamSink, Streamer, SynthesisEngine, WaveParameters, WaveformLoader,
};
use crate::config::{
    COMMAND_QUEUE_DEPTH, CONSOLE_QUEUE_DEPTH, LOAD_QUEUE_DEPTH, SINE_MODE, SYSTEM_CLOCK_HZ,
};
use crate::error::AwgError;
use crate::hal::pwm::FilterPwm;
use crate::hal::timer::{BasicSampleClock, ClockError, SampleClock, TimerSetting};
use crate::hal::uart::rx_error;
use crate::protocol::{Reply, ReplyFormatter, BANNER};
use crate::types::ArbitraryTable;

type Cs = CriticalSectionRawMutex;

/// Streamer wired to the filter PWM and the trigger pin
pub type OutputStream = Streamer<FilterPwm<'static>, Output<'static>>;

/// Router → interpreter
pub static COMMAND_FIFO: Channel<Cs, u8, COMMAND_QUEUE_DEPTH> = Channel::new();

/// Router → loader
pub static LOAD_FIFO: Channel<Cs, LoadSymbol, LOAD_QUEUE_DEPTH> = Channel::new();

/// Any task → console writer
pub static CONSOLE: Channel<Cs, Reply, CONSOLE_QUEUE_DEPTH> = Channel::new();

/// Interpreter → engine: newest parameter snapshot
pub static REGENERATE: Signal<Cs, WaveParameters> = Signal::new();

/// Loader → engine: completed arbitrary table
pub static ARBITRARY_LOADED: Signal<Cs, ArbitraryTable> = Signal::new();

static STREAMER: Mutex<Cs, RefCell<Option<OutputStream>>> = Mutex::new(RefCell::new(None));
static SAMPLE_CLOCK: Mutex<Cs, RefCell<Option<BasicSampleClock<'static>>>> =
    Mutex::new(RefCell::new(None));

/// Hand the sample clock and streamer over to the shared slots.
///
/// Must run before the TIM6 interrupt is unmasked.
pub fn install(clock: BasicSampleClock<'static>, streamer: OutputStream) {
    SAMPLE_CLOCK.lock(|slot| *slot.borrow_mut() = Some(clock));
    STREAMER.lock(|slot| *slot.borrow_mut() = Some(streamer));
}

/// TIM6 update interrupt body
pub fn on_sample_tick() {
    STREAMER.lock(|slot| {
        if let Some(stream) = slot.borrow_mut().as_mut() {
            stream.tick();
        }
    });
    with_clock(|clock| clock.clear_interrupt());
}

fn with_clock<R>(f: impl FnOnce(&mut BasicSampleClock<'static>) -> R) -> Option<R> {
    SAMPLE_CLOCK.lock(|slot| slot.borrow_mut().as_mut().map(f))
}

fn with_stream(f: impl FnOnce(&mut OutputStream)) {
    STREAMER.lock(|slot| {
        if let Some(stream) = slot.borrow_mut().as_mut() {
            f(stream);
        }
    });
}

/// Task-side handle to the shared sample clock
pub struct SharedClock;

impl SampleClock for SharedClock {
    fn configure(&mut self, rate_hz: u32) -> Result<TimerSetting, ClockError> {
        with_clock(|clock| clock.configure(rate_hz))
            .unwrap_or_else(|| TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, rate_hz))
    }

    fn set_interrupt(&mut self, enable: bool) {
        with_clock(|clock| clock.set_interrupt(enable));
    }

    fn start(&mut self) {
        with_clock(|clock| clock.start());
    }

    fn stop(&mut self) {
        with_clock(|clock| clock.stop());
    }

    fn clear_interrupt(&mut self) {
        with_clock(|clock| clock.clear_interrupt());
    }
}

/// Task-side handle to the shared streamer
pub struct SharedStream;

impl StreamSink for SharedStream {
    fn publish(&mut self, program: &StreamProgram) {
        with_stream(|stream| stream.publish(program));
    }

    fn halt(&mut self) {
        with_stream(|stream| stream.halt());
    }
}

fn notify(reply: Reply) {
    if CONSOLE.try_send(reply).is_err() {
        trace!("console full, reply dropped");
    }
}

fn report(routed: Routed) {
    match routed {
        Routed::Forwarded(_) | Routed::Ignored => {}
        Routed::Overflow(fifo) => {
            warn!("{} FIFO full, byte dropped", fifo);
            notify(Reply::Error(AwgError::Overflow(fifo)));
        }
        Routed::Discarded(e) => warn!("rx {} error, byte discarded", e),
        Routed::LoadStarted => {
            info!("input mode: LOAD");
            notify(Reply::LoadStarted);
        }
        Routed::LoadComplete => info!("input mode: CMD (table complete)"),
        Routed::LoadAborted => {
            warn!("input mode: CMD (load aborted)");
            notify(Reply::LoadAborted);
        }
    }
}

/// Serial receive loop; routes every byte without blocking on the FIFOs
pub async fn serial_router<R>(mut rx: R) -> !
where
    R: Read<Error = usart::Error>,
{
    let mut router = Router::new();
    let mut chunk = [0u8; 16];

    loop {
        match rx.read(&mut chunk).await {
            Ok(n) => {
                for &byte in &chunk[..n] {
                    report(router.route(Ok(byte), &COMMAND_FIFO, &LOAD_FIFO));
                }
            }
            Err(e) => report(router.route(Err(rx_error(e)), &COMMAND_FIFO, &LOAD_FIFO)),
        }
    }
}

/// Command interpreter loop
pub async fn command_interpreter() -> ! {
    let mut interpreter = Interpreter::new();

    loop {
        let byte = COMMAND_FIFO.receive().await;
        let action = interpreter.feed(byte);

        let snapshot = match action {
            Action::Apply(applied) => {
                stop_stream(&mut SharedClock, &mut SharedStream);
                debug!("apply {}", applied.params);
                Some(applied.params)
            }
            Action::Reset => {
                LOAD_FIFO.clear();
                debug!("input reset");
                None
            }
            Action::Overflow(_) => {
                warn!("command line overflow");
                None
            }
            Action::Invalid => {
                warn!("unknown command");
                None
            }
            Action::Idle | Action::Echo(_) => None,
        };

        for reply in action.replies() {
            CONSOLE.send(reply).await;
        }
        if let Some(params) = snapshot {
            REGENERATE.signal(params);
        }
    }
}

/// Arbitrary waveform loader loop
pub async fn waveform_loader() -> ! {
    let mut loader = WaveformLoader::new();

    loop {
        match loader.feed(LOAD_FIFO.receive().await) {
            LoadProgress::Started => debug!("loader restarted"),
            LoadProgress::Pending => {}
            LoadProgress::Stored(index) => trace!("sample {} = {}", index, loader.table()[index]),
            LoadProgress::Complete => {
                LOAD_FIFO.clear();
                info!("arbitrary waveform received");
                ARBITRARY_LOADED.signal(*loader.table());
                CONSOLE.send(Reply::LoadComplete).await;
            }
        }
    }
}

/// Synthesis engine loop: regenerates on either notification
pub async fn synthesis_engine() -> ! {
    let mut engine = SynthesisEngine::new(SINE_MODE);
    let mut clock = SharedClock;
    let mut stream = SharedStream;

    loop {
        let outcome = match select(REGENERATE.wait(), ARBITRARY_LOADED.wait()).await {
            Either::First(params) => engine.apply(params, &mut clock, &mut stream),
            Either::Second(table) => engine.load_arbitrary(&table, &mut clock, &mut stream),
        };

        let params = engine.params();
        match outcome {
            Ok(Some(setting)) => info!(
                "streaming {} @ {} Hz ({})",
                params.wave,
                params.frequency.sample_rate(),
                setting
            ),
            Ok(None) => debug!("output idle ({})", params.wave),
            Err(e) => {
                error!("regenerate failed: {}", e);
                CONSOLE.send(Reply::Error(e)).await;
            }
        }
    }
}

/// Console writer: banner first, then every queued reply
pub async fn console<W: Write>(mut tx: W) -> ! {
    let mut formatter = ReplyFormatter::new();

    for line in BANNER {
        if tx.write_all(formatter.line(line).as_bytes()).await.is_err() {
            warn!("console write failed");
        }
    }
    info!("banner sent");

    loop {
        let reply = CONSOLE.receive().await;
        if tx.write_all(formatter.format(&reply).as_bytes()).await.is_err() {
            warn!("console write failed");
        }
    }
}
