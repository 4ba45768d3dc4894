//! Fixed-length captured message

use core::ops::Deref;

use crate::config::MESSAGE_LENGTH;

/// A captured message of exactly [`MESSAGE_LENGTH`] bytes
///
/// Starts zero-filled; the receiver fills it in place, most significant
/// bit first within each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message([u8; MESSAGE_LENGTH]);

impl Message {
    /// Create a zero-filled message
    pub const fn new() -> Self {
        Self([0; MESSAGE_LENGTH])
    }

    /// Copy a message out of a slice, if it has the right length
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; MESSAGE_LENGTH] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Message contents
    pub fn as_bytes(&self) -> &[u8; MESSAGE_LENGTH] {
        &self.0
    }

    /// Mutable message contents, for in-place capture
    pub fn as_mut_bytes(&mut self) -> &mut [u8; MESSAGE_LENGTH] {
        &mut self.0
    }
}

impl From<[u8; MESSAGE_LENGTH]> for Message {
    fn from(bytes: [u8; MESSAGE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Deref for Message {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
