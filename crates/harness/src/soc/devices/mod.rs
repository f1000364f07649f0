//! Host-side models of device notification ports.

/// Decoder for the core's tohost notification stream.
pub mod tohost;

pub use tohost::{HostDecoder, Outcome};
