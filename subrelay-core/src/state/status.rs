//! Status snapshots for display layers
//!
//! A snapshot is a `Copy` value taken after each capture or transmit.
//! Renderers receive their own copy and never share live relay state.

use super::machine::State;
use crate::message::Message;
use crate::transmitter::TransmitError;

/// User-facing status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayStatus {
    /// Most recent attempt did not go out (or none yet)
    Ready,
    /// Most recent attempt was transmitted
    Transmitted,
}

/// Immutable view of the relay after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    /// Relay state
    pub state: State,
    /// Status to show the user
    pub display: DisplayStatus,
    /// Transmit attempts since the message was armed
    pub attempts: u32,
    /// Successful transmits since the message was armed
    pub successes: u32,
    /// Failure reason of the most recent attempt
    pub last_error: Option<TransmitError>,
    /// Message being relayed, if any
    pub message: Option<Message>,
}

impl StatusSnapshot {
    /// Snapshot before anything has happened
    pub const fn initial() -> Self {
        Self {
            state: State::Idle,
            display: DisplayStatus::Ready,
            attempts: 0,
            successes: 0,
            last_error: None,
            message: None,
        }
    }

    /// Check if the most recent attempt went out
    pub fn is_transmitted(&self) -> bool {
        self.display == DisplayStatus::Transmitted
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
