//! Hardware abstraction traits
//!
//! These traits define the interface between the relay logic and
//! device-specific implementations. GPIO lines come from `subrelay-hal`.

pub mod radio;

pub use radio::SubGhzRadio;
