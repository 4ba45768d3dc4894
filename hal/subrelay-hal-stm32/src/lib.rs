//! STM32-specific HAL for the subrelay firmware
//!
//! This crate provides STM32 implementations of the `subrelay-hal`
//! traits on top of embassy-stm32. Supported chips:
//!
//! - STM32WB55RG
//!
//! # Features
//!
//! - `stm32wb55rg` - Enable support for STM32WB55RG
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod gpio;

pub use gpio::InputBank;
pub use subrelay_hal::{GpioInput, Level, Pin, PinError, Pull, Speed};
