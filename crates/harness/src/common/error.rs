//! Error definitions for the test driver.
//!
//! This module defines the failure modes of every stage of a run. It provides:
//! 1. **Format Errors:** Malformed VMH headers, bad tokens, and unaligned word counts.
//! 2. **Load Errors:** Format or I/O failures tagged with the image path.
//! 3. **Transport Errors:** Failures of the underlying transactor endpoint.
//! 4. **Protocol Errors:** Anomalies in the tohost notification stream.
//! 5. **Run Errors:** The union the testbench escalates to its caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed VMH text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The first token of the image is not the `@0` address marker.
    #[error("missing @0 header")]
    MissingHeader,

    /// A token after the header is not a valid 32-bit hexadecimal word.
    #[error("invalid word {token:?} on line {line}")]
    InvalidWord {
        /// One-based source line of the offending token.
        line: usize,
        /// The token as it appeared in the source.
        token: String,
    },

    /// The word count is not a multiple of the record width.
    #[error("unaligned image: {leftover} leftover words")]
    Unaligned {
        /// Words left in the partially filled record buffer.
        leftover: usize,
    },
}

/// Failure to turn an image file into memory-init records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image could not be opened or read.
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        /// Path of the image.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The image was read but is not valid VMH.
    #[error("'{}': {source}", .path.display())]
    Format {
        /// Path of the image.
        path: PathBuf,
        /// What was wrong with the text.
        #[source]
        source: FormatError,
    },
}

impl LoadError {
    /// Path of the image that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Format { path, .. } => path,
        }
    }
}

/// Failure of a transactor endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer side of an in-process channel has gone away.
    #[error("transactor peer disconnected")]
    Disconnected,

    /// Reading or writing the underlying stream failed.
    #[error("transport I/O: {0}")]
    Io(#[from] io::Error),

    /// An inbound line could not be decoded as a tohost message.
    #[error("malformed tohost message on line {line}: {source}")]
    Decode {
        /// One-based line number on the inbound stream.
        line: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An outbound message could not be encoded.
    #[error("could not encode host message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Anomaly in the tohost notification stream.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The event source ended before the core reported an exit code.
    #[error("tohost stream closed before an exit code was received")]
    StreamClosed,

    /// A notification arrived after the exit code had already been handled.
    #[error("tohost notification after exit code")]
    AlreadyFinished,

    /// The event source itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Writing decoded output to the diagnostic stream failed.
    #[error("diagnostic output: {0}")]
    Diagnostic(#[source] io::Error),
}

/// Fatal error for a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// An image failed to load.
    #[error("failed to load memory: {0}")]
    Load(#[from] LoadError),

    /// Reset, memory init, start, or shutdown could not be delivered.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The tohost stream misbehaved while decoding.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Writing testbench diagnostics failed.
    #[error("diagnostic output: {0}")]
    Diagnostic(#[source] io::Error),
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config '{}': {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::Config`].
    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
