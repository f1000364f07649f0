//! JSON-lines transactor over a reader/writer pair.
//!
//! Outbound [`HostMessage`]s are written one JSON object per line and flushed immediately so a
//! bridge process on the other end of a pipe sees them in order. Inbound lines are parsed as
//! [`ToHost`] objects, e.g. `{"kind":1,"data":65}`; blank lines are skipped and end of input
//! closes the tohost port.

use std::io::{BufRead, Write};

use crate::common::TransportError;
use crate::soc::messages::{HostMessage, MemInit, ToHost};
use crate::soc::traits::Transactor;

/// Transactor speaking JSON lines.
#[derive(Debug)]
pub struct StreamTransactor<R, W> {
    input: R,
    output: W,
    line: usize,
    buf: String,
}

impl<R: BufRead, W: Write> StreamTransactor<R, W> {
    /// Reads tohost notifications from `input` and writes host messages to `output`.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: 0,
            buf: String::new(),
        }
    }

    /// Consumes the transactor, returning the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn send(&mut self, msg: &HostMessage) -> Result<(), TransportError> {
        serde_json::to_writer(&mut self.output, msg).map_err(TransportError::Encode)?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Transactor for StreamTransactor<R, W> {
    fn reset(&mut self) -> Result<(), TransportError> {
        self.send(&HostMessage::Reset)
    }

    fn send_mem_init(&mut self, msg: &MemInit) -> Result<(), TransportError> {
        self.send(&HostMessage::MemInit(*msg))
    }

    fn start(&mut self, pc: u32) -> Result<(), TransportError> {
        self.send(&HostMessage::Start(pc))
    }

    fn recv_tohost(&mut self) -> Result<Option<ToHost>, TransportError> {
        loop {
            self.buf.clear();
            if self.input.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|source| TransportError::Decode {
                    line: self.line,
                    source,
                });
        }
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        self.send(&HostMessage::Shutdown)
    }
}
