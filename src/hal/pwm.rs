//! PWM Driver
//!
//! The waveform leaves the MCU as a PWM carrier whose duty cycle follows the
//! table; an external RC filter reconstructs the analog signal. Duty values
//! live in the fixed domain `0..=DUTY_MAX` and are scaled to the timer's
//! compare range when written.

use core::fmt;

use crate::config::DUTY_MAX;

/// PWM duty cycle in the generator's duty domain (0-254)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// 0% duty cycle
    pub const ZERO: Self = Self(0);

    /// 100% duty cycle
    pub const FULL: Self = Self(DUTY_MAX);

    /// Create from a table sample, saturating at full scale
    #[must_use]
    pub const fn from_raw(value: u16) -> Self {
        if value > DUTY_MAX {
            Self(DUTY_MAX)
        } else {
            Self(value)
        }
    }

    /// Get raw duty-domain value
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Scale to a compare value for a timer whose full scale is `max_compare`
    #[must_use]
    pub const fn to_compare(self, max_compare: u16) -> u16 {
        (max_compare as u32 * self.0 as u32 / DUTY_MAX as u32) as u16
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DutyCycle {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}/{}", self.0, DUTY_MAX);
    }
}

/// PWM configuration failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmError {
    /// Carrier frequency of zero or above the timer clock
    InvalidFrequency,
    /// Compare range smaller than the duty domain
    InsufficientResolution,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmError::InvalidFrequency => write!(f, "pwm frequency invalid"),
            PwmError::InsufficientResolution => write!(f, "pwm resolution too low"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PwmError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            PwmError::InvalidFrequency => defmt::write!(f, "invalid frequency"),
            PwmError::InsufficientResolution => defmt::write!(f, "insufficient resolution"),
        }
    }
}

/// Number of compare steps a carrier leaves at the given timer clock.
///
/// # Errors
///
/// Fails when the carrier cannot be generated or leaves fewer than
/// `DUTY_MAX` steps, which would make some table values indistinguishable.
pub fn carrier_steps(clock_hz: u32, carrier_hz: u32) -> Result<u32, PwmError> {
    if carrier_hz == 0 || carrier_hz > clock_hz {
        return Err(PwmError::InvalidFrequency);
    }
    let steps = clock_hz / carrier_hz;
    if steps < u32::from(DUTY_MAX) {
        return Err(PwmError::InsufficientResolution);
    }
    Ok(steps)
}

/// PWM output the streamer writes samples to
pub trait PwmOutput {
    /// Update the compare value for the next carrier period
    fn set_duty(&mut self, duty: DutyCycle);
}

/// TIM1 channel 1 PWM output feeding the reconstruction filter
#[cfg(feature = "embedded")]
pub struct FilterPwm<'d> {
    pwm: embassy_stm32::timer::simple_pwm::SimplePwm<'d, embassy_stm32::peripherals::TIM1>,
    max_compare: u16,
}

#[cfg(feature = "embedded")]
impl<'d> FilterPwm<'d> {
    /// Check the carrier resolution, then start TIM1 CH1 at 0% duty.
    ///
    /// # Errors
    ///
    /// Returns [`PwmError`] when the carrier leaves too few compare steps.
    pub fn new(
        tim: impl embassy_stm32::Peripheral<P = embassy_stm32::peripherals::TIM1> + 'd,
        pin: impl embassy_stm32::Peripheral<P = impl embassy_stm32::timer::Channel1Pin<embassy_stm32::peripherals::TIM1>> + 'd,
        timer_clock_hz: u32,
        carrier_hz: u32,
    ) -> Result<Self, PwmError> {
        use embassy_stm32::gpio::OutputType;
        use embassy_stm32::time::Hertz;
        use embassy_stm32::timer::low_level::CountingMode;
        use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};

        carrier_steps(timer_clock_hz, carrier_hz)?;

        let ch1 = PwmPin::new_ch1(pin, OutputType::PushPull);
        let mut pwm = SimplePwm::new(
            tim,
            Some(ch1),
            None,
            None,
            None,
            Hertz(carrier_hz),
            CountingMode::EdgeAlignedUp,
        );
        let max_compare = pwm.max_duty_cycle();
        let mut channel = pwm.ch1();
        channel.set_duty_cycle(0);
        channel.enable();

        Ok(Self { pwm, max_compare })
    }
}

#[cfg(feature = "embedded")]
impl PwmOutput for FilterPwm<'_> {
    fn set_duty(&mut self, duty: DutyCycle) {
        let compare = duty.to_compare(self.max_compare);
        self.pwm.ch1().set_duty_cycle(compare);
    }
}
