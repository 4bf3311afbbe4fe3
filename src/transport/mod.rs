//! Completion transports
//!
//! The coordinator and the walkers only talk through two traits:
//!
//! - [`Endpoint`]: a walker's handle for sending its one completion message
//! - [`Inbox`]: the coordinator's wildcard receive, `receive_from_any()`
//!
//! Both expose `finalize()`, the joint shutdown point reached once every
//! completion is accounted for.
//!
//! # Implementations
//!
//! - **channel**: walkers as threads in one process, one shared crossbeam queue
//! - **tcp**: walkers as separate processes, framed messages over TCP
//!
//! Neither transport orders messages across senders. Both deliver each sender's
//! messages intact and in order.

pub mod channel;
pub mod tcp;

use crate::error::TransportError;
use crate::protocol::CompletionMessage;

pub use channel::{channel_pair, ChannelEndpoint, ChannelInbox};
pub use tcp::{TcpEndpoint, TcpInbox};

/// A completion message together with the sender it arrived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Rank the transport attributes the message to
    pub source: u32,

    /// The message itself
    pub message: CompletionMessage,
}

/// Walker side of a transport
pub trait Endpoint: Send {
    /// Rank of the walker owning this endpoint
    fn rank(&self) -> u32;

    /// Hand the completion message to the transport
    ///
    /// Blocks until the transport accepts the message. There is no retry: an
    /// error here is fatal to the walker.
    fn send(&mut self, message: CompletionMessage) -> Result<(), TransportError>;

    /// Wait for the coordinator's joint shutdown
    fn finalize(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Coordinator side of a transport
pub trait Inbox {
    /// Block until a completion arrives from any walker
    fn receive_from_any(&mut self) -> Result<Received, TransportError>;

    /// Release every walker once all completions are in
    fn finalize(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<E: Endpoint + ?Sized> Endpoint for Box<E> {
    fn rank(&self) -> u32 {
        (**self).rank()
    }

    fn send(&mut self, message: CompletionMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }

    fn finalize(&mut self) -> Result<(), TransportError> {
        (**self).finalize()
    }
}

impl<I: Inbox + ?Sized> Inbox for Box<I> {
    fn receive_from_any(&mut self) -> Result<Received, TransportError> {
        (**self).receive_from_any()
    }

    fn finalize(&mut self) -> Result<(), TransportError> {
        (**self).finalize()
    }
}
