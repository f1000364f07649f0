//! Host-side test driver for a transactor-attached processor core.
//!
//! This crate drives a simulated core through an abstract transactor with the following:
//! 1. **Loader:** Parses VMH memory images into 512-bit memory-init records.
//! 2. **Decoder:** Turns the core's tohost notifications into characters, integers, and a pass/fail outcome.
//! 3. **Testbench:** Resets the device, loads each image, starts the core, and decodes until exit.
//! 4. **Transactors:** The transport trait plus in-process channel and JSON-lines stream endpoints.
//! 5. **Reporting:** Configuration, error types, and a per-run summary.

/// Common types and constants (record geometry, default start PC, errors).
pub mod common;
/// Driver configuration (defaults and JSON deserialization).
pub mod config;
/// VMH loader and the per-image testbench loop.
pub mod sim;
/// Device-facing side: wire messages, the tohost decoder, and transactors.
pub mod soc;
/// Run summary collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Per-image testbench that owns a transactor and a diagnostic writer.
pub use crate::sim::testbench::Testbench;
/// Decoder for the tohost notification stream.
pub use crate::soc::devices::tohost::{HostDecoder, Outcome};
/// Transport abstraction consumed by the testbench.
pub use crate::soc::traits::Transactor;
/// Outcome collection for a whole run.
pub use crate::stats::RunSummary;
