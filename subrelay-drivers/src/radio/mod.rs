//! Sub-GHz radio implementations

pub mod cc1101;
// pub mod sx1231;  // Future

pub use cc1101::{Band, Cc1101, Cc1101Config, Cc1101Error};
