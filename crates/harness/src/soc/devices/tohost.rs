//! Tohost notification decoder.
//!
//! The core reports progress by emitting tohost notifications, each a 2-bit kind and a
//! 16-bit payload:
//!
//! * `PrintChar` prints the low byte of the payload.
//! * `PrintIntLow` latches the low half of a 32-bit integer.
//! * `PrintIntHigh` ors in the high half and prints the integer in decimal.
//! * `ExitCode` ends the program: `0` passes, anything else fails with that code.
//!
//! Kinds outside this set are ignored. The decoder does not enforce low-before-high; a
//! high half on its own combines with whatever low half was last latched.

use std::fmt;
use std::io::{self, Write};

use tracing::trace;

use crate::common::{ProtocolError, TransportError};
use crate::soc::messages::{HostEvent, ToHost};

/// How a program run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code zero.
    Passed,
    /// Non-zero exit code.
    Failed(u16),
}

impl Outcome {
    /// Maps a core exit code to an outcome.
    pub const fn from_exit_code(code: u16) -> Self {
        if code == 0 { Self::Passed } else { Self::Failed(code) }
    }

    /// Returns `true` for [`Outcome::Passed`].
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The exit code the core reported.
    pub const fn exit_code(self) -> u16 {
        match self {
            Self::Passed => 0,
            Self::Failed(code) => code,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed(code) => write!(f, "FAILED: exit code = {code}"),
        }
    }
}

/// Decodes one program run's tohost stream into diagnostic output.
///
/// A decoder is good for exactly one run: once an exit code has been handled further
/// notifications are rejected. Create a new one per image.
#[derive(Debug)]
pub struct HostDecoder<W> {
    out: W,
    pending_int: u32,
    outcome: Option<Outcome>,
}

impl<W: Write> HostDecoder<W> {
    /// Creates a decoder writing program output to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            pending_int: 0,
            outcome: None,
        }
    }

    /// Returns `true` until an exit code has been handled.
    pub const fn is_running(&self) -> bool {
        self.outcome.is_none()
    }

    /// The outcome, once the program has exited.
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Integer currently latched from the print-int halves.
    pub const fn pending_int(&self) -> u32 {
        self.pending_int
    }

    /// Applies one raw notification.
    ///
    /// Returns the outcome when `raw` is the exit code, `None` otherwise.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::AlreadyFinished`] if the run has already exited, and
    /// [`ProtocolError::Diagnostic`] if writing the output fails.
    pub fn step(&mut self, raw: ToHost) -> Result<Option<Outcome>, ProtocolError> {
        if !self.is_running() {
            return Err(ProtocolError::AlreadyFinished);
        }
        let Some(event) = HostEvent::decode(raw) else {
            trace!(kind = raw.kind, data = raw.data, "ignoring unknown tohost kind");
            return Ok(None);
        };
        self.apply(event).map_err(ProtocolError::Diagnostic)
    }

    fn apply(&mut self, event: HostEvent) -> io::Result<Option<Outcome>> {
        match event {
            HostEvent::PrintChar(c) => {
                self.out.write_all(&[c as u8])?;
            }
            HostEvent::PrintIntLow(low) => {
                self.pending_int = u32::from(low);
            }
            HostEvent::PrintIntHigh(high) => {
                self.pending_int |= u32::from(high) << 16;
                // Printed signed, as the core's runtime expects.
                write!(self.out, "{}", self.pending_int as i32)?;
            }
            HostEvent::ExitCode(code) => {
                let outcome = Outcome::from_exit_code(code);
                writeln!(self.out, "{outcome}")?;
                self.out.flush()?;
                self.outcome = Some(outcome);
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    /// Drives the decoder over `events` until the program exits.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::StreamClosed`] if `events` ends before an exit code,
    /// [`ProtocolError::Transport`] if the source reports an error, and any error from
    /// [`HostDecoder::step`].
    pub fn run<I>(&mut self, events: I) -> Result<Outcome, ProtocolError>
    where
        I: IntoIterator<Item = Result<ToHost, TransportError>>,
    {
        for event in events {
            if let Some(outcome) = self.step(event?)? {
                return Ok(outcome);
            }
        }
        Err(ProtocolError::StreamClosed)
    }

    /// Consumes the decoder, returning the output writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
