//! Configuration types
//!
//! Board-agnostic relay configuration, optionally stored as postcard
//! binary data.

pub mod types;

pub use types::*;
