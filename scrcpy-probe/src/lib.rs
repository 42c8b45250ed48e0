//! Support code for the `scrcpy-probe` binary.

pub mod config;
pub mod transport;
