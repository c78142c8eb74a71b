//! Timer and PWM Tests
//!
//! Prescaler search for the sample clock and PWM carrier resolution.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test timer_tests

use awg_firmware::config::{DUTY_MAX, PWM_FREQUENCY_HZ, SYSTEM_CLOCK_HZ, WAVEFORM_SIZE};
use awg_firmware::error::{AwgError, Peripheral};
use awg_firmware::hal::pwm::{carrier_steps, DutyCycle, PwmError};
use awg_firmware::hal::timer::{ClockError, TimerSetting};
use awg_firmware::types::Frequency;

// =============================================================================
// Prescaler Search Tests
// =============================================================================

#[test]
fn prescaler_one_for_high_rates() {
    // 100 Hz * 400 = 40 kHz: 170 MHz / 40 kHz = 4250 ticks
    let setting = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, 40_000).unwrap();
    assert_eq!(setting.prescaler, 1);
    assert_eq!(setting.prescaler_index, 0);
    assert_eq!(setting.period, 4249);
    assert_eq!(setting.actual_hz(SYSTEM_CLOCK_HZ), 40_000);
}

#[test]
fn prescaler_steps_up_for_low_rates() {
    // 1 Hz * 400 = 400 Hz: 425_000 ticks does not fit 16 bits at /1
    let setting = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, 400).unwrap();
    assert_eq!(setting.prescaler, 8);
    assert_eq!(setting.prescaler_index, 3);
    // 170 MHz / (400 * 8) - 1
    assert_eq!(setting.period, 53_124);
}

#[test]
fn every_output_frequency_is_representable() {
    for hz in 1..=Frequency::MAX_HZ {
        let rate = Frequency::from_hz(hz).unwrap().sample_rate();
        let setting = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, rate)
            .unwrap_or_else(|e| panic!("{hz} Hz: {e}"));

        // Within 0.1 % of the requested rate
        let actual = setting.actual_hz(SYSTEM_CLOCK_HZ);
        assert!(actual.abs_diff(rate) * 1000 <= rate, "{hz} Hz -> {actual}");
    }
}

#[test]
fn zero_frequency_rejected() {
    assert_eq!(
        TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, 0),
        Err(ClockError::ZeroFrequency)
    );
}

#[test]
fn rate_too_fast() {
    assert_eq!(
        TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, SYSTEM_CLOCK_HZ),
        Err(ClockError::TooFast)
    );
}

#[test]
fn rate_too_slow() {
    // 170 MHz / 256 / 65536 is about 10 Hz
    assert_eq!(
        TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, 5),
        Err(ClockError::TooSlow)
    );
}

#[test]
fn clock_error_converts_to_configuration() {
    let err: AwgError = ClockError::TooSlow.into();
    assert_eq!(err, AwgError::Configuration(ClockError::TooSlow));
    assert!(!err.is_fatal());
}

#[test]
fn slowest_rate_needs_larger_prescaler() {
    let table_rate = WAVEFORM_SIZE as u32;
    let slow = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, table_rate).unwrap();
    let fast = TimerSetting::for_frequency(SYSTEM_CLOCK_HZ, table_rate * 300).unwrap();
    assert!(slow.prescaler > fast.prescaler);
}

// =============================================================================
// PWM Tests
// =============================================================================

#[test]
fn duty_cycle_saturates() {
    assert_eq!(DutyCycle::from_raw(100).raw(), 100);
    assert_eq!(DutyCycle::from_raw(DUTY_MAX).raw(), DUTY_MAX);
    assert_eq!(DutyCycle::from_raw(1000), DutyCycle::FULL);
    assert_eq!(DutyCycle::default(), DutyCycle::ZERO);
}

#[test]
fn duty_cycle_compare_scaling() {
    assert_eq!(DutyCycle::ZERO.to_compare(999), 0);
    assert_eq!(DutyCycle::FULL.to_compare(999), 999);
    assert_eq!(DutyCycle::from_raw(127).to_compare(254), 127);
    // 127 / 254 of 1000
    assert_eq!(DutyCycle::from_raw(127).to_compare(1000), 500);
}

#[test]
fn carrier_resolution_accepted() {
    let steps = carrier_steps(SYSTEM_CLOCK_HZ, PWM_FREQUENCY_HZ).unwrap();
    assert!(steps >= u32::from(DUTY_MAX));
}

#[test]
fn carrier_resolution_too_low() {
    // 170 MHz / 1 MHz leaves only 170 steps
    assert_eq!(
        carrier_steps(SYSTEM_CLOCK_HZ, 1_000_000),
        Err(PwmError::InsufficientResolution)
    );
}

#[test]
fn carrier_invalid_frequency() {
    assert_eq!(carrier_steps(SYSTEM_CLOCK_HZ, 0), Err(PwmError::InvalidFrequency));
    assert_eq!(
        carrier_steps(SYSTEM_CLOCK_HZ, SYSTEM_CLOCK_HZ + 1),
        Err(PwmError::InvalidFrequency)
    );
}

#[test]
fn pwm_error_is_fatal_hardware_fault() {
    let err: AwgError = PwmError::InsufficientResolution.into();
    assert_eq!(
        err,
        AwgError::HardwareFault(Peripheral::Pwm(PwmError::InsufficientResolution))
    );
    assert!(err.is_fatal());
}
