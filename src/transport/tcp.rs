//! TCP transport for process-per-participant runs
//!
//! The coordinator binds a [`TcpInbox`] and accepts any number of walker
//! connections. Each connection gets its own task that reads a REGISTER frame,
//! then a single COMPLETION frame, and forwards it together with the
//! connection's write half into one queue. `receive_from_any()` pops that queue,
//! so whichever walker finishes first is received first. The source of a
//! completion is the rank the connection registered with.
//!
//! A connection that closes before its next frame starts is a lost walker: it is
//! logged and the coordinator keeps waiting. Anything else that goes wrong on a
//! connection (an undecodable or truncated frame, a frame out of sequence) is a
//! receive failure and surfaces from `receive_from_any()`.
//!
//! Walkers use a [`TcpEndpoint`]: connect and register, send one COMPLETION
//! frame, then wait for FINALIZE before exiting. Connecting is retried a bounded number of times
//! because walkers may be launched before the coordinator is listening. The send
//! itself is never retried.
//!
//! Each side owns a small tokio runtime and exposes a blocking API, so walker and
//! coordinator logic stay synchronous.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Endpoint, Inbox, Received};
use crate::error::TransportError;
use crate::protocol::{read_message, read_message_or_eof, write_message, CompletionMessage, Message};

/// Events produced by connection tasks
enum Incoming {
    Report {
        received: Received,
        reply: OwnedWriteHalf,
    },
    Fatal(String),
}

/// Coordinator side of the TCP transport
pub struct TcpInbox {
    runtime: Runtime,
    local_addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<Incoming>,
    peers: Vec<(u32, OwnedWriteHalf)>,
    accept_task: JoinHandle<()>,
}

impl TcpInbox {
    /// Bind the coordinator listener
    ///
    /// Use port 0 to let the OS pick a port and read it back with
    /// [`TcpInbox::local_addr`].
    pub fn bind(addr: &str) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("randwalk-inbox")
            .enable_all()
            .build()?;

        let listener = runtime.block_on(TcpListener::bind(addr))?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "coordinator listening");

        let (tx, rx) = mpsc::unbounded_channel();
        let accept_task = runtime.spawn(accept_loop(listener, tx));

        Ok(Self {
            runtime,
            local_addr,
            rx,
            peers: Vec::new(),
            accept_task,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Inbox for TcpInbox {
    fn receive_from_any(&mut self) -> Result<Received, TransportError> {
        match self.runtime.block_on(self.rx.recv()) {
            Some(Incoming::Report { received, reply }) => {
                self.peers.push((received.source, reply));
                Ok(received)
            }
            Some(Incoming::Fatal(reason)) => Err(TransportError::ReceiveFailed(reason)),
            None => Err(TransportError::Disconnected { outstanding: 0 }),
        }
    }

    fn finalize(&mut self) -> Result<(), TransportError> {
        self.accept_task.abort();

        let peers = std::mem::take(&mut self.peers);
        self.runtime.block_on(async {
            for (rank, mut reply) in peers {
                if let Err(e) = write_message(&mut reply, &Message::Finalize).await {
                    // The walker already reported; it may have gone away on its own
                    warn!(rank, error = %e, "failed to deliver finalize");
                }
            }
        });

        debug!("finalize sent to all reporting walkers");
        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, tx: mpsc::UnboundedSender<Incoming>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "walker connected");
                tokio::spawn(handle_connection(stream, peer, tx.clone()));
            }
            Err(e) => {
                let _ = tx.send(Incoming::Fatal(format!("accept failed: {}", e)));
                return;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, tx: mpsc::UnboundedSender<Incoming>) {
    let (mut read_half, write_half) = stream.into_split();

    let rank = match read_message_or_eof(&mut read_half).await {
        Ok(Some(Message::Register { rank })) => rank,
        Ok(Some(other)) => {
            fail(&tx, format!("{} sent {:?} before REGISTER", peer, other));
            return;
        }
        Ok(None) => {
            warn!(%peer, "connection closed before registering");
            return;
        }
        Err(e) => {
            fail(&tx, format!("{} sent a bad REGISTER frame: {}", peer, e));
            return;
        }
    };
    debug!(%peer, rank, "walker registered");

    match read_message_or_eof(&mut read_half).await {
        Ok(Some(Message::Completion(message))) => {
            let received = Received { source: rank, message };
            let _ = tx.send(Incoming::Report {
                received,
                reply: write_half,
            });
        }
        Ok(Some(other)) => {
            fail(&tx, format!("walker {} sent {:?} instead of COMPLETION", rank, other));
        }
        Ok(None) => {
            // The walker is unaccounted for; the coordinator keeps waiting for it
            warn!(%peer, rank, "connection closed before a completion arrived");
        }
        Err(e) => {
            fail(&tx, format!("walker {} sent a bad COMPLETION frame: {}", rank, e));
        }
    }
}

fn fail(tx: &mpsc::UnboundedSender<Incoming>, reason: String) {
    warn!(%reason, "receive failure");
    let _ = tx.send(Incoming::Fatal(reason));
}

/// Walker side of the TCP transport
pub struct TcpEndpoint {
    rank: u32,
    runtime: Runtime,
    stream: TcpStream,
}

impl TcpEndpoint {
    /// Connect to the coordinator and register `rank`
    ///
    /// The connect is retried up to `attempts` times.
    /// The wait between attempts starts at `backoff` and doubles, capped at 2s.
    pub fn connect(addr: &str, rank: u32, attempts: u32, backoff: Duration) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let attempts = attempts.max(1);
        let mut stream = runtime.block_on(async {
            let mut delay = backoff;
            let mut attempt = 1;
            loop {
                match TcpStream::connect(addr).await {
                    Ok(stream) => return Ok(stream),
                    Err(e) if attempt < attempts => {
                        debug!(rank, attempt, error = %e, "coordinator not reachable yet");
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(Duration::from_secs(2));
                        attempt += 1;
                    }
                    Err(e) => {
                        return Err(TransportError::Connect {
                            addr: addr.to_string(),
                            attempts,
                            source: e,
                        })
                    }
                }
            }
        })?;

        stream.set_nodelay(true)?;
        runtime.block_on(write_message(&mut stream, &Message::Register { rank }))?;
        debug!(rank, addr, "registered with coordinator");

        Ok(Self { rank, runtime, stream })
    }
}

impl Endpoint for TcpEndpoint {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn send(&mut self, message: CompletionMessage) -> Result<(), TransportError> {
        let rank = self.rank;
        self.runtime
            .block_on(write_message(&mut self.stream, &Message::Completion(message)))
            .map_err(|e| TransportError::SendFailed {
                walker_id: rank,
                reason: e.to_string(),
            })
    }

    fn finalize(&mut self) -> Result<(), TransportError> {
        match self.runtime.block_on(read_message(&mut self.stream))? {
            Message::Finalize => Ok(()),
            other => Err(TransportError::Codec(format!("expected FINALIZE, got {:?}", other))),
        }
    }
}
