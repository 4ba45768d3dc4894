//! Subrelay Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that chip-specific
//! HALs implement, so the capture and relay logic in `subrelay-core` runs
//! unchanged on real silicon and against host-side simulations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (subrelay-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  subrelay-core (receiver, transmitter)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  subrelay-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ subrelay-hal-   │
//!            │     stm32       │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioInput`] - Polled digital inputs addressed by [`gpio::Pin`]
//!
//! Timing is not abstracted here; consumers use
//! `embedded_hal::delay::DelayNs` directly.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{GpioInput, Level, Pin, PinError, Port, Pull, Speed, PINS_PER_PORT};
