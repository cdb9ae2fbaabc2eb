//! Errors raised while switching relays.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("unknown mode \"{0}\", expected one of: off, grid, inverter")]
    UnknownMode(String),

    #[cfg(feature = "rpi")]
    #[error("gpio error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}
