//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Capture events
    /// Capture started
    StartCapture,
    /// Full message captured (or partial message accepted by policy)
    CaptureComplete,
    /// Capture ended without a usable message
    CaptureFailed(ErrorKind),

    // Transmit events
    /// Transmit attempt started
    StartTransmit,
    /// Radio reported success
    TransmitComplete,
    /// Transmit attempt failed
    TransmitFailed(ErrorKind),

    /// Drop any held message
    Reset,
}
