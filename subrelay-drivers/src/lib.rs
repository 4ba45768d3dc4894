//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in subrelay-core:
//!
//! - Sub-GHz transceivers (CC1101)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod radio;
