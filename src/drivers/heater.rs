//! Zone heater relay driver.
//!
//! Each zone has one active-HIGH relay output.  The driver is generic over
//! [`OutputPin`] so tests can hand it any pin; on the board it drives a
//! [`GpioOutput`] configured by `hw_init`.

use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use log::warn;

use crate::drivers::hw_init;

/// A GPIO already configured as an output by `hw_init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioOutput(pub i32);

impl ErrorType for GpioOutput {
    type Error = core::convert::Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}

pub struct HeaterRelay<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> HeaterRelay<P> {
    /// Take the pin and drive it low.
    pub fn new(pin: P) -> Self {
        let mut relay = Self { pin, on: true };
        relay.set(false);
        relay
    }

    pub fn set(&mut self, on: bool) {
        if self.pin.set_state(PinState::from(on)).is_err() {
            warn!("heater relay: pin write failed");
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
