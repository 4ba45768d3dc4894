//! Bounded clock-edge waiting
//!
//! The receiver never blocks on a line indefinitely: each wait polls at a
//! fixed interval for a fixed number of attempts, and checks the cancel
//! token between polls.

use embedded_hal::delay::DelayNs;
use subrelay_hal::{GpioInput, Level, Pin, PinError};

use crate::cancel::CancelToken;
use crate::config::ReceiverTiming;

/// Clock transition being waited for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Clock going high (sample point)
    Rising,
    /// Clock going low (end of bit)
    Falling,
}

impl Edge {
    /// Level the clock shows once this edge has happened
    pub fn level(self) -> Level {
        match self {
            Edge::Rising => Level::High,
            Edge::Falling => Level::Low,
        }
    }
}

/// Result of a bounded edge wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// Clock reached the edge's level
    EdgeObserved,
    /// Poll budget exhausted
    TimedOut,
    /// Cancel token tripped during the wait
    Cancelled,
}

/// Poll `clock` until it shows `edge`'s level
///
/// The level is checked before each sleep, so a clock already at the
/// target level is observed without delay. At most
/// `timing.edge_timeout_polls` polls are made.
pub fn wait_for_edge<G, D>(
    gpio: &mut G,
    delay: &mut D,
    clock: Pin,
    edge: Edge,
    timing: &ReceiverTiming,
    cancel: &CancelToken,
) -> Result<WaitOutcome, PinError>
where
    G: GpioInput,
    D: DelayNs,
{
    let target = edge.level();
    for _ in 0..timing.edge_timeout_polls {
        if gpio.read_level(clock)? == target {
            return Ok(WaitOutcome::EdgeObserved);
        }
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }
        delay.delay_ms(timing.poll_interval_ms);
    }
    Ok(WaitOutcome::TimedOut)
}
