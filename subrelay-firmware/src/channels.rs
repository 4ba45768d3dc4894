//! Inter-task communication channels
//!
//! Static embassy-sync primitives shared between the relay loop and the
//! status task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use subrelay_core::state::StatusSnapshot;
use subrelay_core::CancelToken;

/// Latest relay status (updated after every capture and transmit)
pub static RELAY_STATUS: Signal<CriticalSectionRawMutex, StatusSnapshot> = Signal::new();

/// Aborts an in-progress capture at its next poll
pub static RELAY_CANCEL: CancelToken = CancelToken::new();
