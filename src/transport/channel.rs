//! In-process channel transport
//!
//! All walker endpoints share the sending side of one unbounded crossbeam channel
//! and the coordinator owns the only receiver, which gives receive-from-any for
//! free. The endpoint stamps its own rank on every message so the coordinator can
//! tell which walker a message really came from.
//!
//! The inbox never holds a sender itself. When every endpoint has been dropped
//! and the queue is empty, `receive_from_any()` reports
//! [`TransportError::Disconnected`] instead of blocking forever.

use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::trace;

use super::{Endpoint, Inbox, Received};
use crate::error::TransportError;
use crate::protocol::CompletionMessage;

/// Create an inbox and one endpoint per walker (ranks `1..=num_walkers`)
pub fn channel_pair(num_walkers: usize) -> (ChannelInbox, Vec<ChannelEndpoint>) {
    let (tx, rx) = unbounded();

    let endpoints = (1..=num_walkers as u32)
        .map(|rank| ChannelEndpoint {
            rank,
            tx: tx.clone(),
        })
        .collect();

    // The original sender drops here so the inbox can observe disconnection
    drop(tx);

    (ChannelInbox { rx }, endpoints)
}

/// Walker side of the channel transport
#[derive(Debug)]
pub struct ChannelEndpoint {
    rank: u32,
    tx: Sender<Received>,
}

impl Endpoint for ChannelEndpoint {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn send(&mut self, message: CompletionMessage) -> Result<(), TransportError> {
        trace!(rank = self.rank, steps = message.steps_taken, "channel send");
        self.tx
            .send(Received {
                source: self.rank,
                message,
            })
            .map_err(|_| TransportError::SendFailed {
                walker_id: self.rank,
                reason: "coordinator inbox is closed".to_string(),
            })
    }
}

/// Coordinator side of the channel transport
#[derive(Debug)]
pub struct ChannelInbox {
    rx: Receiver<Received>,
}

impl Inbox for ChannelInbox {
    fn receive_from_any(&mut self) -> Result<Received, TransportError> {
        self.rx
            .recv()
            .map_err(|_| TransportError::Disconnected { outstanding: 0 })
    }
}
