//! State machine definition

use super::events::Event;
use crate::receiver::ReadError;
use crate::transmitter::TransmitError;

/// Relay states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing captured yet
    Idle,
    /// Sampling the clock/data lines
    Receiving,
    /// A message is held and ready to transmit
    Armed,
    /// Transmit sequence in progress
    Transmitting,
    /// Last capture failed; no message held
    Error(ErrorKind),
}

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Clock peer stopped responding
    CaptureTimeout,
    /// Capture cancelled by the caller
    CaptureCancelled,
    /// Buffer or message of the wrong size
    InvalidLength,
    /// GPIO line could not be configured or read
    PinFault,
    /// Radio tuned outside its legal bands
    InvalidFrequency,
    /// Radio bus or transmit failure
    RadioFault,
}

impl From<ReadError> for ErrorKind {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::InvalidLength { .. } => ErrorKind::InvalidLength,
            ReadError::Pin { .. } => ErrorKind::PinFault,
            ReadError::TimedOut { .. } => ErrorKind::CaptureTimeout,
            ReadError::Cancelled { .. } => ErrorKind::CaptureCancelled,
        }
    }
}

impl From<TransmitError> for ErrorKind {
    fn from(e: TransmitError) -> Self {
        match e {
            TransmitError::InvalidLength { .. } => ErrorKind::InvalidLength,
            TransmitError::InvalidFrequency { .. } => ErrorKind::InvalidFrequency,
            TransmitError::Hardware => ErrorKind::RadioFault,
        }
    }
}

impl State {
    /// Check if a message is held for transmission
    pub fn is_armed(&self) -> bool {
        matches!(self, State::Armed | State::Transmitting)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // A new capture can start from anywhere except mid-transmit
            (Idle | Armed | Error(_), StartCapture) => Receiving,

            (Receiving, CaptureComplete) => Armed,
            (Receiving, CaptureFailed(kind)) => Error(kind),

            (Armed, StartTransmit) => Transmitting,

            // The message stays armed for the next attempt either way
            (Transmitting, TransmitComplete) => Armed,
            (Transmitting, TransmitFailed(_)) => Armed,

            (_, Reset) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
