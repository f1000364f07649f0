//! In-process transactor over `std::sync::mpsc` channels.
//!
//! [`channel_pair`] returns the host half, which implements [`Transactor`], and a
//! [`DeviceEndpoint`] that a model of the core (or a test) uses to observe host messages
//! and emit tohost notifications. Either half may live on its own thread.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::common::TransportError;
use crate::soc::messages::{HostMessage, MemInit, ToHost};
use crate::soc::traits::Transactor;

/// Host half of an in-process transactor.
#[derive(Debug)]
pub struct ChannelTransactor {
    to_device: Sender<HostMessage>,
    from_device: Receiver<ToHost>,
}

/// Device half of an in-process transactor.
#[derive(Debug)]
pub struct DeviceEndpoint {
    from_host: Receiver<HostMessage>,
    to_host: Sender<ToHost>,
}

/// Creates a connected host/device pair.
pub fn channel_pair() -> (ChannelTransactor, DeviceEndpoint) {
    let (to_device, from_host) = mpsc::channel();
    let (to_host, from_device) = mpsc::channel();
    (
        ChannelTransactor {
            to_device,
            from_device,
        },
        DeviceEndpoint { from_host, to_host },
    )
}

impl ChannelTransactor {
    fn send(&self, msg: HostMessage) -> Result<(), TransportError> {
        self.to_device
            .send(msg)
            .map_err(|_| TransportError::Disconnected)
    }
}

impl Transactor for ChannelTransactor {
    fn reset(&mut self) -> Result<(), TransportError> {
        self.send(HostMessage::Reset)
    }

    fn send_mem_init(&mut self, msg: &MemInit) -> Result<(), TransportError> {
        self.send(HostMessage::MemInit(*msg))
    }

    fn start(&mut self, pc: u32) -> Result<(), TransportError> {
        self.send(HostMessage::Start(pc))
    }

    fn recv_tohost(&mut self) -> Result<Option<ToHost>, TransportError> {
        // A dropped device endpoint closes the port.
        Ok(self.from_device.recv().ok())
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        self.send(HostMessage::Shutdown)
    }
}

impl DeviceEndpoint {
    /// Blocks for the next host message; `None` once the host half is dropped.
    pub fn recv(&self) -> Option<HostMessage> {
        self.from_host.recv().ok()
    }

    /// Returns the next host message if one is already queued.
    pub fn try_recv(&self) -> Option<HostMessage> {
        self.from_host.try_recv().ok()
    }

    /// Emits one tohost notification.
    ///
    /// # Errors
    ///
    /// [`TransportError::Disconnected`] if the host half has been dropped.
    pub fn send(&self, notification: impl Into<ToHost>) -> Result<(), TransportError> {
        self.to_host
            .send(notification.into())
            .map_err(|_| TransportError::Disconnected)
    }

    /// Emits a sequence of notifications in order.
    ///
    /// # Errors
    ///
    /// Stops at the first [`TransportError::Disconnected`].
    pub fn send_all<I>(&self, notifications: I) -> Result<(), TransportError>
    where
        I: IntoIterator,
        I::Item: Into<ToHost>,
    {
        notifications.into_iter().try_for_each(|n| self.send(n))
    }
}
