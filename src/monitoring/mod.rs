//! Monitoring layer: exit status decoding and liveness caching

pub mod status;

pub use status::{ExitStatus, Liveness};
