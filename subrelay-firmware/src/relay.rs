//! Relay loop
//!
//! Captures from the serial link until a message is armed, then sends it
//! once per attempt interval forever. Capture and transmit both block;
//! the executor only gets control back during the pause between
//! attempts.

use defmt::*;
use embassy_time::Timer;
use embedded_hal::delay::DelayNs;

use subrelay_core::traits::SubGhzRadio;
use subrelay_core::{RelayController, RelayError};
use subrelay_hal_stm32::GpioInput;

use crate::channels::{RELAY_CANCEL, RELAY_STATUS};

/// Run the relay forever
pub async fn run<G, D, R>(mut relay: RelayController<G, D, R>, attempt_interval_ms: u32) -> !
where
    G: GpioInput,
    D: DelayNs,
    R: SubGhzRadio,
{
    let interval = u64::from(attempt_interval_ms);

    info!("Waiting for message on serial link");
    while !relay.state().is_armed() {
        match relay.capture(&RELAY_CANCEL) {
            Ok(message) => info!("Captured {:02x}", message.as_bytes()),
            Err(e) => warn!("Capture failed: {}", e),
        }
        RELAY_STATUS.signal(relay.snapshot());
        RELAY_CANCEL.reset();

        if !relay.state().is_armed() {
            Timer::after_millis(interval).await;
        }
    }

    loop {
        match relay.relay_once() {
            Ok(()) => {}
            Err(RelayError::Transmit(e)) => debug!("Attempt failed: {}", e),
            Err(RelayError::NotArmed) => {
                error!("Relay lost its armed message");
            }
        }
        RELAY_STATUS.signal(relay.snapshot());

        Timer::after_millis(interval).await;
    }
}
