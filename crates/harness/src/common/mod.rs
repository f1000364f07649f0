//! Common utilities and types used throughout the test driver.
//!
//! It includes:
//! 1. **Constants:** Memory-init record geometry and the default core entry point.
//! 2. **Error Handling:** Loader, transport, protocol, and run-level error types.

/// Common constants used throughout the driver.
pub mod constants;

/// Error types for loading, transport, and decoding.
pub mod error;

pub use constants::{DEFAULT_START_PC, WORDS_PER_RECORD};
pub use error::{ConfigError, FormatError, LoadError, ProtocolError, RunError, TransportError};
