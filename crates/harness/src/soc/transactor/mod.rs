//! Concrete transactor endpoints.
//!
//! 1. **Channel:** In-process `mpsc` pair; the device side is driven by a co-simulation thread or a test.
//! 2. **Stream:** JSON lines over any reader/writer pair; the CLI binds it to stdin/stdout or files.

/// In-process channel transactor and its device endpoint.
pub mod channel;
/// JSON-lines stream transactor.
pub mod stream;

pub use channel::{ChannelTransactor, DeviceEndpoint, channel_pair};
pub use stream::StreamTransactor;
