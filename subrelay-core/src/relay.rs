//! Capture-and-relay controller
//!
//! Couples a [`BitStreamReceiver`] and a [`PacketTransmitter`] behind the
//! relay state machine. The driver loop calls [`RelayController::capture`]
//! until a message is armed, then [`RelayController::relay_once`] at its
//! own pace; after each call [`RelayController::snapshot`] describes the
//! result for display.

use embedded_hal::delay::DelayNs;
use subrelay_hal::{GpioInput, Pin};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, PartialReadPolicy, RelayConfig};
use crate::message::Message;
use crate::receiver::{BitStreamReceiver, ReadError};
use crate::state::{DisplayStatus, Event, State, StatusSnapshot};
use crate::traits::SubGhzRadio;
use crate::transmitter::{PacketTransmitter, TransmitError};

/// Relay operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError {
    /// No message has been armed for transmission
    NotArmed,
    /// Transmit attempt failed
    Transmit(TransmitError),
}

impl From<TransmitError> for RelayError {
    fn from(e: TransmitError) -> Self {
        RelayError::Transmit(e)
    }
}

/// Capture-and-relay controller
pub struct RelayController<G, D, R> {
    receiver: BitStreamReceiver<G, D>,
    transmitter: PacketTransmitter<R>,
    clock: Pin,
    data: Pin,
    partial_read: PartialReadPolicy,
    state: State,
    armed: Option<Message>,
    status: StatusSnapshot,
}

impl<G, D, R> RelayController<G, D, R>
where
    G: GpioInput,
    D: DelayNs,
    R: SubGhzRadio,
{
    /// Create a controller
    ///
    /// # Arguments
    /// - `gpio`, `delay`: Capture hardware
    /// - `radio`: Transmitter hardware, owned exclusively
    /// - `clock`, `data`: Input lines of the serial link
    /// - `config`: Relay configuration, validated here
    pub fn new(
        gpio: G,
        delay: D,
        radio: R,
        clock: Pin,
        data: Pin,
        config: &RelayConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            receiver: BitStreamReceiver::new(gpio, delay, config.receiver),
            transmitter: PacketTransmitter::new(radio, config.radio),
            clock,
            data,
            partial_read: config.partial_read,
            state: State::Idle,
            armed: None,
            status: StatusSnapshot::initial(),
        })
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Message that `relay_once` would send
    pub fn armed(&self) -> Option<&Message> {
        self.armed.as_ref()
    }

    /// Status as of the last operation
    pub fn snapshot(&self) -> StatusSnapshot {
        self.status
    }

    /// Access the transmitter (and through it, the radio)
    pub fn transmitter(&self) -> &PacketTransmitter<R> {
        &self.transmitter
    }

    /// Capture one message from the serial link
    ///
    /// A successful capture replaces any armed message and resets the
    /// attempt counters. A capture that times out part-way arms the
    /// zero-padded message only under [`PartialReadPolicy::ZeroPad`]; the
    /// timeout is still returned so the caller can tell the difference.
    pub fn capture(&mut self, cancel: &CancelToken) -> Result<Message, ReadError> {
        self.apply(Event::StartCapture);

        let mut message = Message::new();
        let result = self
            .receiver
            .read(self.clock, self.data, message.as_mut_bytes(), cancel);

        match result {
            Ok(()) => {
                self.arm(message);
                Ok(message)
            }
            Err(e @ ReadError::TimedOut { .. })
                if self.partial_read == PartialReadPolicy::ZeroPad =>
            {
                self.arm(message);
                Err(e)
            }
            Err(e) => {
                self.armed = None;
                self.apply(Event::CaptureFailed(e.into()));
                self.status = StatusSnapshot {
                    state: self.state,
                    ..StatusSnapshot::initial()
                };
                Err(e)
            }
        }
    }

    /// Transmit the armed message once
    pub fn relay_once(&mut self) -> Result<(), RelayError> {
        let message = self.armed.ok_or(RelayError::NotArmed)?;

        self.apply(Event::StartTransmit);
        let outcome = self.transmitter.transmit(&message);

        self.status.attempts = self.status.attempts.saturating_add(1);
        match outcome {
            Ok(()) => {
                self.status.successes = self.status.successes.saturating_add(1);
                self.status.display = DisplayStatus::Transmitted;
                self.status.last_error = None;
                self.apply(Event::TransmitComplete);
            }
            Err(e) => {
                self.status.display = DisplayStatus::Ready;
                self.status.last_error = Some(e);
                self.apply(Event::TransmitFailed(e.into()));
            }
        }
        self.status.state = self.state;

        outcome.map_err(RelayError::from)
    }

    /// Drop the armed message and return to idle
    pub fn reset(&mut self) {
        self.armed = None;
        self.apply(Event::Reset);
        self.status = StatusSnapshot::initial();
    }

    fn arm(&mut self, message: Message) {
        self.armed = Some(message);
        self.apply(Event::CaptureComplete);
        self.status = StatusSnapshot {
            state: self.state,
            message: Some(message),
            ..StatusSnapshot::initial()
        };
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }
}
