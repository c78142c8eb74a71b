//! Sample Clock
//!
//! The sample clock is a 16-bit timer whose update interrupt paces the
//! output stream at `WAVEFORM_SIZE × frequency`. The prescaler search is
//! pure and testable on the host; the target driver programs TIM6 with the
//! result.

use core::fmt;

use crate::config::{TIMER_MAX_PERIOD, TIMER_PRESCALERS};

/// Reasons a rate cannot be produced by the sample clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// A rate of 0 Hz was requested
    ZeroFrequency,
    /// Rate exceeds the timer kernel clock resolution
    TooFast,
    /// Rate needs a longer period than the largest prescaler allows
    TooSlow,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::ZeroFrequency => write!(f, "frequency not set"),
            ClockError::TooFast => write!(f, "frequency not supported (too high)"),
            ClockError::TooSlow => write!(f, "frequency not supported (too low)"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ClockError::ZeroFrequency => defmt::write!(f, "zero frequency"),
            ClockError::TooFast => defmt::write!(f, "too fast"),
            ClockError::TooSlow => defmt::write!(f, "too slow"),
        }
    }
}

/// Prescaler and auto-reload pair for a requested rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSetting {
    /// Position of the prescaler in the ladder
    pub prescaler_index: u8,
    /// Clock division factor
    pub prescaler: u16,
    /// Auto-reload value (timer counts `period + 1` ticks)
    pub period: u16,
}

impl TimerSetting {
    /// Find the smallest prescaler whose period fits 16 bits.
    ///
    /// `period = clock / (rate × prescaler) − 1`, tried in ladder order.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] when the rate is zero or no prescaler fits.
    pub fn for_frequency(clock_hz: u32, rate_hz: u32) -> Result<Self, ClockError> {
        if rate_hz == 0 {
            return Err(ClockError::ZeroFrequency);
        }

        for (index, &prescaler) in TIMER_PRESCALERS.iter().enumerate() {
            let divisor = u64::from(rate_hz) * u64::from(prescaler);
            let ticks = u64::from(clock_hz) / divisor;

            if ticks < 2 {
                // Even the finest prescaler leaves no room for a period
                return Err(ClockError::TooFast);
            }

            let period = ticks - 1;
            if period <= u64::from(TIMER_MAX_PERIOD) {
                return Ok(Self {
                    prescaler_index: index as u8,
                    prescaler,
                    period: period as u16,
                });
            }
        }

        Err(ClockError::TooSlow)
    }

    /// Rate actually produced by this setting
    #[must_use]
    pub fn actual_hz(&self, clock_hz: u32) -> u32 {
        let ticks = u32::from(self.prescaler) * (u32::from(self.period) + 1);
        clock_hz / ticks
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerSetting {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PSC /{} ARR {}", self.prescaler, self.period);
    }
}

/// Hardware timer pacing the output stream
pub trait SampleClock {
    /// Program the timer for `rate_hz` update events per second.
    ///
    /// Stops the timer and disables its interrupt before reprogramming.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the rate cannot be represented; the timer
    /// stays stopped.
    fn configure(&mut self, rate_hz: u32) -> Result<TimerSetting, ClockError>;

    /// Enable or disable the update interrupt
    fn set_interrupt(&mut self, enable: bool);

    /// Start counting
    fn start(&mut self);

    /// Stop counting
    fn stop(&mut self);

    /// Acknowledge the update interrupt
    fn clear_interrupt(&mut self);
}

/// TIM6 basic timer used as the sample clock
#[cfg(feature = "embedded")]
pub struct BasicSampleClock<'d> {
    timer: embassy_stm32::timer::low_level::Timer<'d, embassy_stm32::peripherals::TIM6>,
}

#[cfg(feature = "embedded")]
impl<'d> BasicSampleClock<'d> {
    /// Take ownership of TIM6, stopped with its interrupt disabled
    #[must_use]
    pub fn new(
        tim: impl embassy_stm32::Peripheral<P = embassy_stm32::peripherals::TIM6> + 'd,
    ) -> Self {
        let timer = embassy_stm32::timer::low_level::Timer::new(tim);
        timer.stop();
        timer.enable_update_interrupt(false);
        Self { timer }
    }
}

#[cfg(feature = "embedded")]
impl SampleClock for BasicSampleClock<'_> {
    fn configure(&mut self, rate_hz: u32) -> Result<TimerSetting, ClockError> {
        self.timer.stop();
        self.timer.enable_update_interrupt(false);

        let clock_hz = self.timer.get_clock_frequency().0;
        let setting = TimerSetting::for_frequency(clock_hz, rate_hz)?;

        let regs = self.timer.regs_core();
        regs.psc().write_value(setting.prescaler - 1);
        regs.arr().write(|r| r.set_arr(setting.period));
        // Latch PSC/ARR and restart the counter from zero
        regs.egr().write(|r| r.set_ug(true));
        self.timer.clear_update_interrupt();

        defmt::debug!("sample clock {} Hz: {}", rate_hz, setting);
        Ok(setting)
    }

    fn set_interrupt(&mut self, enable: bool) {
        self.timer.enable_update_interrupt(enable);
    }

    fn start(&mut self) {
        self.timer.start();
    }

    fn stop(&mut self) {
        self.timer.stop();
    }

    fn clear_interrupt(&mut self) {
        self.timer.clear_update_interrupt();
    }
}
