//! Embassy async tasks
//!
//! The relay loop itself runs on the main task (see `relay.rs`); these
//! tasks only consume what it publishes.

pub mod status;

pub use status::status_task;
