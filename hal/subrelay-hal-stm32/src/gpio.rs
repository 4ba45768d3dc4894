//! GPIO input bank for STM32
//!
//! Embassy hands out pins as typed peripherals, so the bank is filled once
//! at startup with `Flex` pins and their logical names. After that the
//! receiver addresses them through [`GpioInput`] by name only.

use embassy_stm32::gpio::{self, Flex};
use heapless::Vec;
use subrelay_hal::{GpioInput, Level, Pin, PinError, Pull, Speed};

/// Fixed-capacity set of runtime-addressable input pins
pub struct InputBank<'d, const N: usize> {
    pins: Vec<(Pin, Flex<'d>), N>,
}

impl<const N: usize> Default for InputBank<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, const N: usize> InputBank<'d, N> {
    /// Create an empty bank
    pub const fn new() -> Self {
        Self { pins: Vec::new() }
    }

    /// Add `flex` under the name `pin`
    ///
    /// The caller is responsible for `pin` naming the same physical pin
    /// that `flex` was created from.
    pub fn register(&mut self, pin: Pin, flex: Flex<'d>) -> Result<(), PinError> {
        if self.is_registered(pin) {
            return Err(PinError::AlreadyRegistered);
        }
        self.pins
            .push((pin, flex))
            .map_err(|_| PinError::BankFull)
    }

    /// Check if a pin is in the bank
    pub fn is_registered(&self, pin: Pin) -> bool {
        self.pins.iter().any(|(p, _)| *p == pin)
    }

    /// Number of registered pins
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Check if the bank is empty
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    fn get(&mut self, pin: Pin) -> Result<&mut Flex<'d>, PinError> {
        self.pins
            .iter_mut()
            .find(|(p, _)| *p == pin)
            .map(|(_, flex)| flex)
            .ok_or(PinError::NotRegistered)
    }
}

fn to_pull(pull: Pull) -> gpio::Pull {
    match pull {
        Pull::None => gpio::Pull::None,
        Pull::Up => gpio::Pull::Up,
        Pull::Down => gpio::Pull::Down,
    }
}

impl<const N: usize> GpioInput for InputBank<'_, N> {
    fn configure_input(&mut self, pin: Pin, pull: Pull, _speed: Speed) -> Result<(), PinError> {
        // OSPEEDR has no effect in input mode
        self.get(pin)?.set_as_input(to_pull(pull));

        #[cfg(feature = "defmt")]
        defmt::debug!("{} configured as input ({})", pin, pull);

        Ok(())
    }

    fn read_level(&mut self, pin: Pin) -> Result<Level, PinError> {
        Ok(Level::from(self.get(pin)?.is_high()))
    }
}
