//! GPIO Abstractions
//!
//! Trigger marker output and the fault indicator.

/// Digital marker asserted during the trigger window
pub trait TriggerOutput {
    /// Drive the marker high (`true`) or low (`false`)
    fn set_active(&mut self, active: bool);
}

#[cfg(feature = "embedded")]
impl TriggerOutput for embassy_stm32::gpio::Output<'_> {
    fn set_active(&mut self, active: bool) {
        if active {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Fault LED driver
///
/// Lit when a peripheral fails during start-up; the firmware then halts.
#[cfg(feature = "embedded")]
pub struct FaultLed<'d> {
    pin: embassy_stm32::gpio::Output<'d>,
}

#[cfg(feature = "embedded")]
impl<'d> FaultLed<'d> {
    /// Create a new fault LED (initially off)
    #[must_use]
    pub fn new(mut pin: embassy_stm32::gpio::Output<'d>) -> Self {
        pin.set_low();
        Self { pin }
    }

    /// Light the LED and spin forever
    pub fn halt(mut self) -> ! {
        self.pin.set_high();
        loop {
            cortex_m::asm::wfi();
        }
    }
}
