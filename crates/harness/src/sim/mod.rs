//! Image loading and the per-image run loop.
//!
//! Provides the VMH loader, which turns image text into memory-init records, and the
//! testbench that pushes those records through a transactor and decodes the result.

pub mod loader;
pub mod testbench;
