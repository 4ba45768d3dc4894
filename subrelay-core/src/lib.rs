//! Board-agnostic capture and relay logic
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Clocked bit-stream capture from two GPIO lines
//! - Sub-GHz packet transmit sequencing
//! - Radio abstraction trait
//! - Relay state machine and status snapshots
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cancel;
pub mod config;
pub mod message;
pub mod receiver;
pub mod relay;
pub mod state;
pub mod traits;
pub mod transmitter;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancelToken;
pub use config::{RelayConfig, MESSAGE_LENGTH};
pub use message::Message;
pub use receiver::{BitStreamReceiver, ReadError};
pub use relay::{RelayController, RelayError};
pub use transmitter::{PacketTransmitter, TransmitError, TransmitOutcome};
