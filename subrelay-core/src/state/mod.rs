//! Relay state machine
//!
//! Tracks where the capture/transmit cycle is and publishes it to outside
//! observers as an immutable [`StatusSnapshot`]. Transitions are explicit,
//! finite and deterministic.

pub mod events;
pub mod machine;
pub mod status;

pub use events::Event;
pub use machine::{ErrorKind, State};
pub use status::{DisplayStatus, StatusSnapshot};
