//! Messages exchanged with the device under test.
//!
//! This module defines the payloads of every transactor port. It provides:
//! 1. **Memory init:** 512-bit `Load` records and the terminating `Done` marker.
//! 2. **Tohost:** The raw kind/data notification and its decoded [`HostEvent`] form.
//! 3. **Host messages:** The outbound envelope used by stream transports.

use serde::{Deserialize, Serialize};

use crate::common::WORDS_PER_RECORD;

/// Sixteen memory words in file order; slot 0 holds the lowest-addressed word.
pub type WideRecord = [u32; WORDS_PER_RECORD];

/// Tohost discriminant values carried in [`ToHost::kind`].
pub mod kind {
    /// Program finished; payload is the exit code.
    pub const EXIT_CODE: u8 = 0;
    /// Print the low byte of the payload as a character.
    pub const PRINT_CHAR: u8 = 1;
    /// Low 16 bits of an integer to print.
    pub const PRINT_INT_LOW: u8 = 2;
    /// High 16 bits of an integer to print; triggers the print.
    pub const PRINT_INT_HIGH: u8 = 3;
}

/// A message on the memory-init port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemInit {
    /// Write one wide record at `address`, counted in records from zero.
    Load {
        /// Record index within the image.
        address: u32,
        /// Record payload.
        data: WideRecord,
    },
    /// End of the image; always the last message for that image.
    Done,
}

/// Raw tohost notification: a 2-bit kind and a 16-bit payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToHost {
    /// Discriminant; see [`kind`].
    pub kind: u8,
    /// Payload.
    pub data: u16,
}

impl ToHost {
    /// Builds a raw notification.
    pub const fn new(kind: u8, data: u16) -> Self {
        Self { kind, data }
    }
}

/// A decoded tohost notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Program finished with this exit code; zero means pass.
    ExitCode(u16),
    /// Character output; only the low byte is significant.
    PrintChar(u16),
    /// Low half of an integer to print.
    PrintIntLow(u16),
    /// High half of an integer to print.
    PrintIntHigh(u16),
}

impl HostEvent {
    /// Decodes a raw notification, or `None` for a kind outside the protocol.
    pub const fn decode(raw: ToHost) -> Option<Self> {
        match raw.kind {
            kind::EXIT_CODE => Some(Self::ExitCode(raw.data)),
            kind::PRINT_CHAR => Some(Self::PrintChar(raw.data)),
            kind::PRINT_INT_LOW => Some(Self::PrintIntLow(raw.data)),
            kind::PRINT_INT_HIGH => Some(Self::PrintIntHigh(raw.data)),
            _ => None,
        }
    }
}

impl From<HostEvent> for ToHost {
    fn from(event: HostEvent) -> Self {
        match event {
            HostEvent::ExitCode(data) => Self::new(kind::EXIT_CODE, data),
            HostEvent::PrintChar(data) => Self::new(kind::PRINT_CHAR, data),
            HostEvent::PrintIntLow(data) => Self::new(kind::PRINT_INT_LOW, data),
            HostEvent::PrintIntHigh(data) => Self::new(kind::PRINT_INT_HIGH, data),
        }
    }
}

/// Everything the host sends toward the device, in one envelope.
///
/// Stream transports serialize one of these per line; the in-process channel carries them as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMessage {
    /// Reset pulse.
    Reset,
    /// Memory-init port message.
    MemInit(MemInit),
    /// Fromhost start PC.
    Start(u32),
    /// Shutdown handshake.
    Shutdown,
}
