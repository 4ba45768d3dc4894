//! GPIO pin abstractions
//!
//! Pins are identified by a port (bank) letter and an index within that
//! port. Both are range-checked on construction, so a [`Pin`] value is
//! always a line that can exist on the target family.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of lines in each GPIO port
pub const PINS_PER_PORT: u8 = 16;

/// GPIO port (bank) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Port {
    /// Look up a port by its letter (case-insensitive)
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Port::A),
            'B' => Some(Port::B),
            'C' => Some(Port::C),
            'D' => Some(Port::D),
            'E' => Some(Port::E),
            'F' => Some(Port::F),
            'G' => Some(Port::G),
            'H' => Some(Port::H),
            _ => None,
        }
    }

    /// Upper-case port letter
    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

/// Errors raised when addressing or configuring a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Port or index out of range, or an unparseable pin name
    InvalidPin,
    /// Pin is valid but has no backing hardware line in this bank
    NotRegistered,
    /// Pin was already registered with a bank
    AlreadyRegistered,
    /// Bank has no room for another pin
    BankFull,
}

/// A digital I/O line: port plus index within the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pin {
    port: Port,
    index: u8,
}

impl Pin {
    /// Create a pin, failing if `index` is outside the port
    pub const fn new(port: Port, index: u8) -> Result<Self, PinError> {
        if index >= PINS_PER_PORT {
            return Err(PinError::InvalidPin);
        }
        Ok(Self { port, index })
    }

    /// Parse a pin name
    ///
    /// Supports formats:
    /// - "PC0" -> (Port C, 0)
    /// - "pb12" -> (Port B, 12)
    /// - "A7" -> (Port A, 7)
    pub fn parse(name: &str) -> Result<Self, PinError> {
        let name = name.trim();
        let name = name
            .strip_prefix('P')
            .or_else(|| name.strip_prefix('p'))
            .unwrap_or(name);

        let mut chars = name.chars();
        let port = chars
            .next()
            .and_then(Port::from_letter)
            .ok_or(PinError::InvalidPin)?;

        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinError::InvalidPin);
        }
        let index: u8 = digits.parse().map_err(|_| PinError::InvalidPin)?;
        Self::new(port, index)
    }

    /// Port this pin belongs to
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Index within the port
    pub const fn index(&self) -> u8 {
        self.index
    }
}

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Check if the level is high (logic 1)
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Level as a single bit (0 or 1)
    pub fn bit(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Input pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Pin slew/sampling speed
///
/// Chips that have no speed setting for inputs ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Polled digital inputs addressed by [`Pin`]
///
/// Implementations own the hardware lines and look them up by identity.
/// No interrupt capability is required.
pub trait GpioInput {
    /// Configure `pin` as a digital input
    fn configure_input(&mut self, pin: Pin, pull: Pull, speed: Speed) -> Result<(), PinError>;

    /// Read the current logic level of `pin`
    fn read_level(&mut self, pin: Pin) -> Result<Level, PinError>;
}

impl<T: GpioInput + ?Sized> GpioInput for &mut T {
    fn configure_input(&mut self, pin: Pin, pull: Pull, speed: Speed) -> Result<(), PinError> {
        T::configure_input(self, pin, pull, speed)
    }

    fn read_level(&mut self, pin: Pin) -> Result<Level, PinError> {
        T::read_level(self, pin)
    }
}
