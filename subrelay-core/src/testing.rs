//! Simulated hardware for host tests
//!
//! [`VirtualClock`] and [`ClockedSource`] share one nanosecond counter:
//! every delay the receiver takes advances the waveform the source
//! presents, so timing behaviour is checked without real sleeps.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use subrelay_hal::{GpioInput, Level, Pin, PinError, Port, Pull, Speed};

use crate::cancel::CancelToken;
use crate::traits::SubGhzRadio;

pub const NS_PER_MS: u64 = 1_000_000;

pub fn clock_pin() -> Pin {
    Pin::new(Port::C, 0).unwrap()
}

pub fn data_pin() -> Pin {
    Pin::new(Port::C, 1).unwrap()
}

/// Delay provider that only advances simulated time
pub struct VirtualClock<'a> {
    now_ns: &'a Cell<u64>,
    cancel_at: Option<(u64, &'a CancelToken)>,
}

impl<'a> VirtualClock<'a> {
    pub fn new(now_ns: &'a Cell<u64>) -> Self {
        Self {
            now_ns,
            cancel_at: None,
        }
    }

    /// Trip `token` once simulated time reaches `at_ms`
    pub fn cancelling_at(mut self, at_ms: u64, token: &'a CancelToken) -> Self {
        self.cancel_at = Some((at_ms * NS_PER_MS, token));
        self
    }

    fn advance(&mut self, ns: u64) {
        let now = self.now_ns.get() + ns;
        self.now_ns.set(now);
        if let Some((at, token)) = self.cancel_at {
            if now >= at {
                token.cancel();
            }
        }
    }
}

impl DelayNs for VirtualClock<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64 * NS_PER_MS);
    }
}

/// Peer driving the clock and data lines
///
/// After `lead_in_ms` of idle-low clock, each bit occupies one period of
/// `2 * half_period_ms`: clock low for the first half, high for the second,
/// with data held for the whole period. Once the bits run out the clock
/// rests at `idle_level`.
pub struct ClockedSource<'a> {
    now_ns: &'a Cell<u64>,
    bits: Vec<u8>,
    lead_in_ms: u64,
    half_period_ms: u64,
    idle_level: Level,
    pub configured: Vec<(Pin, Pull)>,
    pub data_reads: usize,
    data_faults_after: Option<usize>,
}

impl<'a> ClockedSource<'a> {
    pub fn from_bits(now_ns: &'a Cell<u64>, bits: &[u8]) -> Self {
        Self {
            now_ns,
            bits: bits.to_vec(),
            lead_in_ms: 3,
            half_period_ms: 10,
            idle_level: Level::Low,
            configured: Vec::new(),
            data_reads: 0,
            data_faults_after: None,
        }
    }

    pub fn from_bytes(now_ns: &'a Cell<u64>, bytes: &[u8]) -> Self {
        let bits: Vec<u8> = bytes
            .iter()
            .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1))
            .collect();
        Self::from_bits(now_ns, &bits)
    }

    /// Clock that never toggles
    pub fn silent(now_ns: &'a Cell<u64>) -> Self {
        Self::from_bits(now_ns, &[])
    }

    pub fn with_timing(mut self, lead_in_ms: u64, half_period_ms: u64) -> Self {
        self.lead_in_ms = lead_in_ms;
        self.half_period_ms = half_period_ms;
        self
    }

    /// Data line reads fail once `reads` samples have been taken
    pub fn data_fault_after(mut self, reads: usize) -> Self {
        self.data_faults_after = Some(reads);
        self
    }

    pub fn idle_at(mut self, level: Level) -> Self {
        self.idle_level = level;
        self
    }

    fn now_ms(&self) -> u64 {
        self.now_ns.get() / NS_PER_MS
    }

    /// (bit index, clock level) at the current simulated time
    fn position(&self) -> Option<(usize, Level)> {
        let now = self.now_ms();
        if now < self.lead_in_ms {
            return None;
        }
        let period = 2 * self.half_period_ms;
        let elapsed = now - self.lead_in_ms;
        let index = (elapsed / period) as usize;
        if index >= self.bits.len() {
            return None;
        }
        let high = elapsed % period >= self.half_period_ms;
        Some((index, Level::from(high)))
    }

    fn clock_level(&self) -> Level {
        match self.position() {
            Some((_, level)) => level,
            None if self.now_ms() < self.lead_in_ms => Level::Low,
            None => self.idle_level,
        }
    }

    fn data_level(&self) -> Level {
        match self.position() {
            Some((index, _)) => Level::from(self.bits[index] != 0),
            None => Level::Low,
        }
    }

    fn is_configured(&self, pin: Pin) -> bool {
        self.configured.iter().any(|(p, _)| *p == pin)
    }
}

impl GpioInput for ClockedSource<'_> {
    fn configure_input(&mut self, pin: Pin, pull: Pull, _speed: Speed) -> Result<(), PinError> {
        if pin != clock_pin() && pin != data_pin() {
            return Err(PinError::NotRegistered);
        }
        self.configured.push((pin, pull));
        Ok(())
    }

    fn read_level(&mut self, pin: Pin) -> Result<Level, PinError> {
        if !self.is_configured(pin) {
            return Err(PinError::NotRegistered);
        }
        if pin == clock_pin() {
            Ok(self.clock_level())
        } else {
            if self.data_faults_after == Some(self.data_reads) {
                return Err(PinError::InvalidPin);
            }
            self.data_reads += 1;
            Ok(self.data_level())
        }
    }
}

/// One recorded radio interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioCall {
    FlushTx,
    SetFrequency(u32),
    WritePacket(usize),
    StartTx,
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockRadioError;

/// Radio that records every call
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    pub packet: Vec<u8>,
    /// Achieved frequency is the request rounded down to this step
    pub step_hz: u32,
    pub valid_range: core::ops::RangeInclusive<u32>,
    pub fail_flush: bool,
    pub fail_start_tx: bool,
    pub fail_sleep: bool,
    is_valid_queries: Cell<usize>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            packet: Vec::new(),
            step_hz: 1,
            valid_range: 387_000_000..=464_000_000,
            fail_flush: false,
            fail_start_tx: false,
            fail_sleep: false,
            is_valid_queries: Cell::new(0),
        }
    }

    pub fn count(&self, call: RadioCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn sleeps(&self) -> usize {
        self.count(RadioCall::Sleep)
    }

    pub fn validity_queries(&self) -> usize {
        self.is_valid_queries.get()
    }
}

impl SubGhzRadio for MockRadio {
    type Error = MockRadioError;

    fn flush_tx(&mut self) -> Result<(), Self::Error> {
        self.calls.push(RadioCall::FlushTx);
        if self.fail_flush {
            return Err(MockRadioError);
        }
        Ok(())
    }

    fn set_frequency_and_path(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
        self.calls.push(RadioCall::SetFrequency(frequency_hz));
        Ok(frequency_hz - frequency_hz % self.step_hz)
    }

    fn is_frequency_valid(&self, frequency_hz: u32) -> bool {
        self.is_valid_queries.set(self.is_valid_queries.get() + 1);
        self.valid_range.contains(&frequency_hz)
    }

    fn write_packet(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.calls.push(RadioCall::WritePacket(data.len()));
        self.packet = data.to_vec();
        Ok(())
    }

    fn start_tx(&mut self) -> Result<(), Self::Error> {
        self.calls.push(RadioCall::StartTx);
        if self.fail_start_tx {
            return Err(MockRadioError);
        }
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.calls.push(RadioCall::Sleep);
        if self.fail_sleep {
            return Err(MockRadioError);
        }
        Ok(())
    }
}
