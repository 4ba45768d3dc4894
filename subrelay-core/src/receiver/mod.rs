//! Clocked bit-stream receiver
//!
//! Software (bit-banged) synchronous serial receiver. The peer drives the
//! clock; each rising edge marks a data sample, and the clock must return
//! low before the next bit. Bits are packed most significant first into a
//! fixed-length message.
//!
//! Every wait is bounded by [`ReceiverTiming`], so an absent or stalled
//! peer produces [`ReadError::TimedOut`] instead of a hang.

pub mod edge;

use embedded_hal::delay::DelayNs;
use subrelay_hal::{GpioInput, Pin, PinError, Pull, Speed};

use crate::cancel::CancelToken;
use crate::config::{ReceiverTiming, MESSAGE_LENGTH};

pub use edge::{wait_for_edge, Edge, WaitOutcome};

/// Capture errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Output buffer is not exactly one message long
    InvalidLength { len: usize },
    /// Pin could not be configured or read
    Pin {
        error: PinError,
        bytes_received: usize,
    },
    /// Clock did not reach `edge` within the poll budget
    TimedOut { edge: Edge, bytes_received: usize },
    /// Capture aborted through the cancel token
    Cancelled { bytes_received: usize },
}

impl ReadError {
    /// Complete bytes written to the buffer before the failure
    pub fn bytes_received(&self) -> usize {
        match self {
            ReadError::TimedOut { bytes_received, .. }
            | ReadError::Pin { bytes_received, .. }
            | ReadError::Cancelled { bytes_received } => *bytes_received,
            ReadError::InvalidLength { .. } => 0,
        }
    }
}

/// Tag a pin failure with the bytes completed so far
fn pin_error(bytes_received: usize) -> impl FnOnce(PinError) -> ReadError {
    move |error| ReadError::Pin {
        error,
        bytes_received,
    }
}

/// MSB-first bit packer
#[derive(Debug, Clone, Copy, Default)]
pub struct BitAccumulator {
    value: u8,
    bits: u8,
}

impl BitAccumulator {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self { value: 0, bits: 0 }
    }

    /// Shift in one bit; returns the byte once eight bits are in
    pub fn push(&mut self, bit: u8) -> Option<u8> {
        self.value = (self.value << 1) | (bit & 1);
        self.bits += 1;
        if self.bits == 8 {
            let byte = self.value;
            *self = Self::new();
            Some(byte)
        } else {
            None
        }
    }

    /// Bits collected towards the current byte
    pub fn pending_bits(&self) -> u8 {
        self.bits
    }
}

/// Bit-stream receiver over two GPIO lines
pub struct BitStreamReceiver<G, D> {
    gpio: G,
    delay: D,
    timing: ReceiverTiming,
}

impl<G: GpioInput, D: DelayNs> BitStreamReceiver<G, D> {
    /// Create a receiver
    ///
    /// # Arguments
    /// - `gpio`: Lines the clock and data pins belong to
    /// - `delay`: Delay used for polling and settling
    /// - `timing`: Poll interval, per-edge budget and settle delay
    pub fn new(gpio: G, delay: D, timing: ReceiverTiming) -> Self {
        Self {
            gpio,
            delay,
            timing,
        }
    }

    /// Current timing policy
    pub fn timing(&self) -> &ReceiverTiming {
        &self.timing
    }

    /// Give back the GPIO and delay providers
    pub fn release(self) -> (G, D) {
        (self.gpio, self.delay)
    }

    /// Capture one message into `out`
    ///
    /// `out` must be exactly [`MESSAGE_LENGTH`] bytes. Each completed byte
    /// is written as soon as its eighth bit arrives; on timeout or
    /// cancellation the bytes already written stay and the rest of `out`
    /// is left as it was.
    pub fn read(
        &mut self,
        clock: Pin,
        data: Pin,
        out: &mut [u8],
        cancel: &CancelToken,
    ) -> Result<(), ReadError> {
        if out.len() != MESSAGE_LENGTH {
            return Err(ReadError::InvalidLength { len: out.len() });
        }

        self.gpio
            .configure_input(clock, Pull::Up, Speed::High)
            .map_err(pin_error(0))?;
        self.gpio
            .configure_input(data, Pull::Up, Speed::High)
            .map_err(pin_error(0))?;

        let mut acc = BitAccumulator::new();
        let mut byte_index = 0;

        while byte_index < MESSAGE_LENGTH {
            self.wait(clock, Edge::Rising, byte_index, cancel)?;

            let bit = self
                .gpio
                .read_level(data)
                .map_err(pin_error(byte_index))?
                .bit();
            if let Some(byte) = acc.push(bit) {
                out[byte_index] = byte;
                byte_index += 1;
                if byte_index == MESSAGE_LENGTH {
                    break;
                }
            }

            self.delay.delay_ms(self.timing.settle_delay_ms);
            self.wait(clock, Edge::Falling, byte_index, cancel)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Captured {} bytes", MESSAGE_LENGTH);

        Ok(())
    }

    fn wait(
        &mut self,
        clock: Pin,
        edge: Edge,
        bytes_received: usize,
        cancel: &CancelToken,
    ) -> Result<(), ReadError> {
        let outcome = wait_for_edge(
            &mut self.gpio,
            &mut self.delay,
            clock,
            edge,
            &self.timing,
            cancel,
        )
        .map_err(pin_error(bytes_received))?;

        match outcome {
            WaitOutcome::EdgeObserved => Ok(()),
            WaitOutcome::TimedOut => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Clock {} timeout after {} bytes",
                    edge,
                    bytes_received
                );
                Err(ReadError::TimedOut {
                    edge,
                    bytes_received,
                })
            }
            WaitOutcome::Cancelled => Err(ReadError::Cancelled { bytes_received }),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use proptest::prelude::*;

    use super::*;
    use crate::testing::{clock_pin, data_pin, ClockedSource, VirtualClock, NS_PER_MS};
    use subrelay_hal::Level;

    const REFERENCE: [u8; MESSAGE_LENGTH] = [0xB2, 0x00, 0xFF, 0x5A, 0xA5, 0x01, 0x80, 0x3C];

    fn receiver<'a>(
        source: ClockedSource<'a>,
        now: &'a Cell<u64>,
    ) -> BitStreamReceiver<ClockedSource<'a>, VirtualClock<'a>> {
        BitStreamReceiver::new(source, VirtualClock::new(now), ReceiverTiming::default())
    }

    #[test]
    fn test_accumulator_msb_first() {
        let mut acc = BitAccumulator::new();
        let bits = [1, 0, 1, 1, 0, 0, 1, 0];
        for &bit in &bits[..7] {
            assert_eq!(acc.push(bit), None);
        }
        assert_eq!(acc.pending_bits(), 7);
        assert_eq!(acc.push(bits[7]), Some(0xB2));
        assert_eq!(acc.pending_bits(), 0);
    }

    #[test]
    fn test_first_byte_from_bit_pattern() {
        let now = Cell::new(0);
        let mut bits = vec![1, 0, 1, 1, 0, 0, 1, 0];
        bits.extend(core::iter::repeat(0).take(8 * (MESSAGE_LENGTH - 1)));
        let mut rx = receiver(ClockedSource::from_bits(&now, &bits), &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new()), Ok(()));
        assert_eq!(out[0], 0xB2);
        assert!(out[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reads_full_message() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::from_bytes(&now, &REFERENCE), &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new()), Ok(()));
        assert_eq!(out, REFERENCE);

        // One data sample per bit
        let (source, _) = rx.release();
        assert_eq!(source.data_reads, 8 * MESSAGE_LENGTH);
    }

    #[test]
    fn test_short_high_phase() {
        // Clock high for less than the settle delay
        let now = Cell::new(0);
        let source = ClockedSource::from_bytes(&now, &REFERENCE).with_timing(0, 3);
        let mut rx = receiver(source, &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new()), Ok(()));
        assert_eq!(out, REFERENCE);
    }

    #[test]
    fn test_configures_pull_up_inputs() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::from_bytes(&now, &REFERENCE), &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new())
            .unwrap();

        let (source, _) = rx.release();
        assert_eq!(
            source.configured,
            vec![(clock_pin(), Pull::Up), (data_pin(), Pull::Up)]
        );
    }

    #[test]
    fn test_silent_clock_leaves_buffer_untouched() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::silent(&now), &now);

        let mut out = [0xAAu8; MESSAGE_LENGTH];
        let result = rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new());

        assert_eq!(
            result,
            Err(ReadError::TimedOut {
                edge: Edge::Rising,
                bytes_received: 0
            })
        );
        assert_eq!(out, [0xAA; MESSAGE_LENGTH]);
        // Returns within one edge budget
        assert!(now.get() <= ReceiverTiming::default().edge_timeout_ms() * NS_PER_MS);
    }

    #[test]
    fn test_timeout_mid_message_keeps_completed_bytes() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::from_bytes(&now, &REFERENCE[..3]), &now);

        let mut out = [0xEEu8; MESSAGE_LENGTH];
        let result = rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new());

        assert_eq!(
            result,
            Err(ReadError::TimedOut {
                edge: Edge::Rising,
                bytes_received: 3
            })
        );
        assert_eq!(result.unwrap_err().bytes_received(), 3);
        assert_eq!(out[..3], REFERENCE[..3]);
        assert!(out[3..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_clock_stuck_high_times_out_on_falling_edge() {
        let now = Cell::new(0);
        let source = ClockedSource::from_bits(&now, &[1, 1, 0]).idle_at(Level::High);
        let mut rx = receiver(source, &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        let result = rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new());

        assert_eq!(
            result,
            Err(ReadError::TimedOut {
                edge: Edge::Falling,
                bytes_received: 0
            })
        );
    }

    #[test]
    fn test_worst_case_bound() {
        // A peer that stops after the last bit but one still returns in bounded time
        let now = Cell::new(0);
        let bits = vec![1u8; 8 * MESSAGE_LENGTH - 1];
        let mut rx = receiver(ClockedSource::from_bits(&now, &bits), &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        let result = rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new());

        assert_eq!(result.unwrap_err().bytes_received(), MESSAGE_LENGTH - 1);
        let bound_ms = MESSAGE_LENGTH as u64 * 2 * ReceiverTiming::default().edge_timeout_ms();
        assert!(now.get() <= bound_ms * NS_PER_MS);
    }

    #[test]
    fn test_invalid_buffer_length() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::from_bytes(&now, &REFERENCE), &now);

        let mut short = [0u8; MESSAGE_LENGTH - 1];
        assert_eq!(
            rx.read(clock_pin(), data_pin(), &mut short, &CancelToken::new()),
            Err(ReadError::InvalidLength {
                len: MESSAGE_LENGTH - 1
            })
        );

        let mut empty: [u8; 0] = [];
        assert_eq!(
            rx.read(clock_pin(), data_pin(), &mut empty, &CancelToken::new()),
            Err(ReadError::InvalidLength { len: 0 })
        );

        // Nothing touched: no pins configured, no time spent
        let (source, _) = rx.release();
        assert!(source.configured.is_empty());
        assert_eq!(now.get(), 0);
    }

    #[test]
    fn test_pin_configuration_failure() {
        let now = Cell::new(0);
        let mut rx = receiver(ClockedSource::from_bytes(&now, &REFERENCE), &now);
        let stray = Pin::new(subrelay_hal::Port::A, 3).unwrap();

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(
            rx.read(stray, data_pin(), &mut out, &CancelToken::new()),
            Err(ReadError::Pin {
                error: PinError::NotRegistered,
                bytes_received: 0,
            })
        );
    }

    #[test]
    fn test_pin_fault_mid_message_keeps_progress() {
        let now = Cell::new(0);
        // Third byte's first sample fails
        let source = ClockedSource::from_bytes(&now, &REFERENCE).data_fault_after(16);
        let mut rx = receiver(source, &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        let err = rx
            .read(clock_pin(), data_pin(), &mut out, &CancelToken::new())
            .unwrap_err();

        assert_eq!(
            err,
            ReadError::Pin {
                error: PinError::InvalidPin,
                bytes_received: 2,
            }
        );
        assert_eq!(err.bytes_received(), 2);
        assert_eq!(&out[..2], &REFERENCE[..2]);
        assert_eq!(&out[2..], &[0u8; MESSAGE_LENGTH - 2]);
    }

    #[test]
    fn test_pre_cancelled_token_aborts() {
        let now = Cell::new(0);
        let token = CancelToken::new();
        token.cancel();
        // Lead-in keeps the clock low so the first wait has to poll
        let source = ClockedSource::from_bytes(&now, &REFERENCE).with_timing(50, 10);
        let mut rx = receiver(source, &now);

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(
            rx.read(clock_pin(), data_pin(), &mut out, &token),
            Err(ReadError::Cancelled { bytes_received: 0 })
        );
        assert_eq!(now.get(), 0);
    }

    #[test]
    fn test_cancel_mid_message() {
        let now = Cell::new(0);
        let token = CancelToken::new();
        let source = ClockedSource::from_bytes(&now, &REFERENCE[..2]);
        let clock = VirtualClock::new(&now).cancelling_at(2_000, &token);
        let mut rx = BitStreamReceiver::new(source, clock, ReceiverTiming::default());

        let mut out = [0u8; MESSAGE_LENGTH];
        assert_eq!(
            rx.read(clock_pin(), data_pin(), &mut out, &token),
            Err(ReadError::Cancelled { bytes_received: 2 })
        );
        assert_eq!(out[..2], REFERENCE[..2]);
        assert_eq!(now.get(), 2_000 * NS_PER_MS);
    }

    proptest! {
        #[test]
        fn prop_reconstructs_any_message(
            bytes in proptest::array::uniform8(any::<u8>()),
            lead_in in 0u64..50,
            half_period in 6u64..25,
        ) {
            let now = Cell::new(0);
            let source = ClockedSource::from_bytes(&now, &bytes).with_timing(lead_in, half_period);
            let mut rx = receiver(source, &now);

            let mut out = [0u8; MESSAGE_LENGTH];
            prop_assert_eq!(rx.read(clock_pin(), data_pin(), &mut out, &CancelToken::new()), Ok(()));
            prop_assert_eq!(out, bytes);
        }
    }
}
