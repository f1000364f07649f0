//! Device-facing side of the test driver.
//!
//! Everything that crosses the transactor boundary lives here: the memory-init and tohost
//! message types, the [`Transactor`](traits::Transactor) seam the testbench is written
//! against, the tohost decoder, and the concrete transport endpoints.

/// Tohost stream decoding (print char/int, exit code).
pub mod devices;
/// Messages exchanged with the device (memory init, fromhost, tohost).
pub mod messages;
/// The transport trait consumed by the testbench.
pub mod traits;
/// Concrete transactor endpoints (in-process channels, JSON-lines streams).
pub mod transactor;

pub use messages::{HostEvent, HostMessage, MemInit, ToHost, WideRecord};
pub use traits::Transactor;
