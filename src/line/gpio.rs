//! Raspberry Pi GPIO outputs.

use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info};

use super::Line;
use crate::error::SwitchError;

/// A BCM-numbered output pin, driven low as soon as it is acquired.
#[derive(Debug)]
pub struct GpioLine {
    pin: OutputPin,
}

impl GpioLine {
    /// Claims `bcm_pin` as an output.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::Gpio`] if the pin is unavailable or already
    /// claimed.
    pub fn open(gpio: &Gpio, bcm_pin: u8) -> Result<Self, SwitchError> {
        let pin = gpio.get(bcm_pin)?.into_output_low();
        info!(pin = bcm_pin, "acquired relay output");
        Ok(Self { pin })
    }
}

impl Line for GpioLine {
    fn set(&mut self, energized: bool) {
        debug!(pin = self.pin.pin(), energized, "gpio write");
        if energized {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
