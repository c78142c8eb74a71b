//! Serial Link
//!
//! USART1 carries the command protocol. Reception is interrupt driven
//! through embassy's buffered UART; this module maps its receive errors
//! onto the router's recovery classes and holds the line settings.

use embassy_stm32::usart::{Config, Error};

use crate::awg::router::RxError;
use crate::config::UART_BAUD_RATE;

/// 8N1 at the command-link baud rate
#[must_use]
pub fn line_config() -> Config {
    let mut config = Config::default();
    config.baudrate = UART_BAUD_RATE;
    config
}

/// Classify a receive error for the router
#[must_use]
pub fn rx_error(error: Error) -> RxError {
    match error {
        Error::Framing => RxError::Framing,
        Error::Parity => RxError::Parity,
        Error::Overrun => RxError::Overrun,
        _ => RxError::Noise,
    }
}
