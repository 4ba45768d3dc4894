//! Configuration type definitions
//!
//! The defaults reproduce the reference timing: 8-byte messages sampled
//! with 1 ms clock polls, a 10 000-poll budget per edge, a 5 ms settle
//! after each sample, and one transmit attempt per second at 433.92 MHz.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of bytes in a captured message
pub const MESSAGE_LENGTH: usize = 8;

/// Default transmit frequency (Hz)
pub const TARGET_FREQUENCY_HZ: u32 = 433_920_000;

/// Clock polls allowed per edge before a capture is abandoned
pub const EDGE_TIMEOUT_POLLS: u32 = 10_000;

/// Sleep between clock polls (ms)
pub const POLL_INTERVAL_MS: u32 = 1;

/// Delay after sampling a bit, before waiting for the clock to fall (ms)
pub const SETTLE_DELAY_MS: u32 = 5;

/// Pause between transmit attempts in the driver loop (ms)
pub const ATTEMPT_INTERVAL_MS: u32 = 1000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Poll interval of zero would spin without yielding
    ZeroPollInterval,
    /// Edge timeout budget of zero can never observe an edge
    ZeroTimeoutBudget,
    /// Transmit frequency not set
    ZeroFrequency,
    /// Stored blob could not be encoded or decoded
    Encoding,
}

/// Clock-edge wait policy for the bit-stream receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverTiming {
    /// Sleep between clock polls (ms)
    pub poll_interval_ms: u32,
    /// Maximum polls per edge
    pub edge_timeout_polls: u32,
    /// Settle delay after each sampled bit (ms)
    pub settle_delay_ms: u32,
}

impl Default for ReceiverTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            edge_timeout_polls: EDGE_TIMEOUT_POLLS,
            settle_delay_ms: SETTLE_DELAY_MS,
        }
    }
}

impl ReceiverTiming {
    /// Longest time a single edge wait can block (ms)
    pub fn edge_timeout_ms(&self) -> u64 {
        self.poll_interval_ms as u64 * self.edge_timeout_polls as u64
    }
}

/// Radio transmit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RadioConfig {
    /// Requested carrier frequency (Hz)
    pub frequency_hz: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: TARGET_FREQUENCY_HZ,
        }
    }
}

/// What to do with a capture that timed out part-way through a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PartialReadPolicy {
    /// Never transmit a partial message
    #[default]
    Discard,
    /// Transmit the partial message with the missing bytes left zero
    ZeroPad,
}

/// Complete relay configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelayConfig {
    /// Capture timing
    pub receiver: ReceiverTiming,
    /// Transmit settings
    pub radio: RadioConfig,
    /// Pause between transmit attempts (ms)
    pub attempt_interval_ms: u32,
    /// Handling of timed-out captures
    pub partial_read: PartialReadPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            receiver: ReceiverTiming::default(),
            radio: RadioConfig::default(),
            attempt_interval_ms: ATTEMPT_INTERVAL_MS,
            partial_read: PartialReadPolicy::Discard,
        }
    }
}

impl RelayConfig {
    /// Reference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.receiver.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.receiver.edge_timeout_polls == 0 {
            return Err(ConfigError::ZeroTimeoutBudget);
        }
        if self.radio.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        Ok(())
    }

    /// Serialize into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encoding)
    }

    /// Deserialize and validate a stored configuration
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Encoding)?;
        config.validate()?;
        Ok(config)
    }
}
