//! Transactor trait: the only view the testbench has of the co-emulation fabric.

use crate::common::TransportError;
use crate::soc::messages::{MemInit, ToHost};

/// One attached device, seen through its message ports.
///
/// The fabric behind an implementation (SCE-MI proxies, sockets, in-process channels) is
/// opaque to the testbench. Outbound operations must preserve call order.
pub trait Transactor {
    /// Pulses the device reset.
    ///
    /// # Errors
    ///
    /// [`TransportError`] if the reset request cannot be delivered.
    fn reset(&mut self) -> Result<(), TransportError>;

    /// Sends one record on the memory-init port.
    ///
    /// # Errors
    ///
    /// [`TransportError`] if the record cannot be delivered.
    fn send_mem_init(&mut self, msg: &MemInit) -> Result<(), TransportError>;

    /// Sends the start program counter on the fromhost port.
    ///
    /// # Errors
    ///
    /// [`TransportError`] if the start message cannot be delivered.
    fn start(&mut self, pc: u32) -> Result<(), TransportError>;

    /// Blocks until the device emits the next tohost notification.
    ///
    /// Returns `Ok(None)` once the device side is closed.
    ///
    /// # Errors
    ///
    /// [`TransportError`] if the port fails or delivers a malformed notification.
    fn recv_tohost(&mut self) -> Result<Option<ToHost>, TransportError>;

    /// Performs the shutdown handshake. Called once per run.
    ///
    /// # Errors
    ///
    /// [`TransportError`] if the handshake cannot be completed.
    fn shutdown(&mut self) -> Result<(), TransportError>;
}

/// Adapts a transactor's tohost port into the event iterator the decoder consumes.
///
/// The iterator ends when [`Transactor::recv_tohost`] reports the port closed.
pub fn tohost_events<T: Transactor + ?Sized>(
    transactor: &mut T,
) -> impl Iterator<Item = Result<ToHost, TransportError>> + '_ {
    std::iter::from_fn(move || transactor.recv_tohost().transpose())
}
