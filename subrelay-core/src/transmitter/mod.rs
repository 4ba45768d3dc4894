//! Sub-GHz packet transmitter
//!
//! Runs the one-shot transmit sequence: flush, tune, validate the achieved
//! frequency, load, transmit. The radio is put to sleep on every exit path
//! once it has been touched, so it is never left keyed up.

use core::ops::{Deref, DerefMut};

use crate::config::{RadioConfig, MESSAGE_LENGTH};
use crate::traits::SubGhzRadio;

/// Transmit failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// Message is not exactly one message long; the radio was not touched
    InvalidLength { len: usize },
    /// Radio tuned to a frequency it may not transmit on
    InvalidFrequency { requested_hz: u32, achieved_hz: u32 },
    /// Radio reported a bus or transmit failure
    Hardware,
}

/// Result of one transmit attempt
pub type TransmitOutcome = Result<(), TransmitError>;

/// Puts the radio to sleep when dropped
struct SleepGuard<'a, R: SubGhzRadio> {
    radio: &'a mut R,
}

impl<R: SubGhzRadio> Deref for SleepGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.radio
    }
}

impl<R: SubGhzRadio> DerefMut for SleepGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.radio
    }
}

impl<R: SubGhzRadio> Drop for SleepGuard<'_, R> {
    fn drop(&mut self) {
        if self.radio.sleep().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Radio did not acknowledge sleep");
        }
    }
}

/// One-shot packet transmitter
///
/// Owns the radio exclusively; `transmit` takes `&mut self`, so attempts
/// are serialized by construction.
pub struct PacketTransmitter<R> {
    radio: R,
    config: RadioConfig,
}

impl<R: SubGhzRadio> PacketTransmitter<R> {
    /// Create a transmitter for the configured frequency
    pub fn new(radio: R, config: RadioConfig) -> Self {
        Self { radio, config }
    }

    /// Radio configuration in use
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Access the underlying radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Give back the radio
    pub fn release(self) -> R {
        self.radio
    }

    /// Transmit `message` once
    ///
    /// Failures are reported, never retried.
    pub fn transmit(&mut self, message: &[u8]) -> TransmitOutcome {
        if message.len() != MESSAGE_LENGTH {
            return Err(TransmitError::InvalidLength { len: message.len() });
        }

        let requested_hz = self.config.frequency_hz;
        let mut radio = SleepGuard {
            radio: &mut self.radio,
        };

        radio.flush_tx().map_err(|_| TransmitError::Hardware)?;

        let achieved_hz = radio
            .set_frequency_and_path(requested_hz)
            .map_err(|_| TransmitError::Hardware)?;

        if !radio.is_frequency_valid(achieved_hz) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Frequency {} Hz (requested {} Hz) not allowed",
                achieved_hz,
                requested_hz
            );
            return Err(TransmitError::InvalidFrequency {
                requested_hz,
                achieved_hz,
            });
        }

        radio
            .write_packet(message)
            .map_err(|_| TransmitError::Hardware)?;

        radio.start_tx().map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Radio transmit failed");
            TransmitError::Hardware
        })?;

        Ok(())
    }
}
