//! Status reporting task
//!
//! Waits for relay status snapshots and logs state changes and transmit
//! results. Stands in for the "Ready" / "Transmitted" indicator.

use defmt::*;

use subrelay_core::state::{DisplayStatus, StatusSnapshot};

use crate::channels::RELAY_STATUS;

/// Status task - logs every snapshot that differs from the previous one
#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started");

    let mut last = StatusSnapshot::initial();

    loop {
        let snapshot = RELAY_STATUS.wait().await;
        if snapshot == last {
            continue;
        }

        if snapshot.state != last.state {
            debug!("Relay state: {} -> {}", last.state, snapshot.state);
        }

        if snapshot.attempts != last.attempts {
            match (snapshot.display, snapshot.last_error) {
                (DisplayStatus::Transmitted, _) => info!(
                    "Transmitted ({}/{} attempts succeeded)",
                    snapshot.successes, snapshot.attempts
                ),
                (DisplayStatus::Ready, Some(e)) => warn!("Transmit failed: {}", e),
                (DisplayStatus::Ready, None) => {}
            }
        }

        if snapshot.state.is_error() && snapshot.state != last.state {
            warn!("Relay error: {}", snapshot.state);
        }

        last = snapshot;
    }
}
