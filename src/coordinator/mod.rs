//! Coordinator
//!
//! Detects global completion: the coordinator blocks on a wildcard receive until
//! exactly one completion message has arrived from every walker.
//!
//! # Receive Loop
//!
//! ```text
//! received = 0
//! while received < expected:
//!     (source, message) = inbox.receive_from_any()   // blocks
//!     log.push(message); received += 1
//! inbox.finalize()                                    // joint shutdown
//! ```
//!
//! Messages are accepted in arrival order. Nothing is filtered or reordered by
//! source.
//!
//! # Known Deadlock
//!
//! There is no timeout. If a walker never reports (crashed process, lost
//! connection) the loop waits forever. The in-process channel transport is the
//! exception: once every sender is gone it surfaces
//! [`TransportError::Disconnected`] instead.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Topology;
use crate::error::{ProtocolError, TransportError, WalkError, WalkResult};
use crate::protocol::CompletionMessage;
use crate::transport::{Inbox, Received};

/// Coordinator bookkeeping, mutated only inside the receive loop
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    expected: usize,
    received: usize,
    log: Vec<CompletionMessage>,
    seen: HashSet<u32>,
}

impl CoordinatorState {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            received: 0,
            log: Vec::with_capacity(expected),
            seen: HashSet::with_capacity(expected),
        }
    }

    pub fn expected_count(&self) -> usize {
        self.expected
    }

    pub fn received_count(&self) -> usize {
        self.received
    }

    /// Messages in arrival order
    pub fn log(&self) -> &[CompletionMessage] {
        &self.log
    }

    /// All walkers have reported
    pub fn is_complete(&self) -> bool {
        self.received == self.expected
    }

    /// Completions still outstanding
    pub fn outstanding(&self) -> usize {
        self.expected - self.received
    }

    /// Account for one received message
    ///
    /// Rejects anything that would break the one-message-per-walker count: a
    /// message past the expected total, an unknown rank, a second report from the
    /// same rank, or a message whose claimed source differs from its sender.
    pub fn accept(&mut self, incoming: Received) -> Result<(), ProtocolError> {
        let source_id = incoming.message.source_id;

        if self.is_complete() {
            return Err(ProtocolError::Surplus {
                source_id,
                expected: self.expected,
            });
        }
        if incoming.source != source_id {
            return Err(ProtocolError::SourceMismatch {
                claimed: source_id,
                actual: incoming.source,
            });
        }
        if source_id == 0 || source_id as usize > self.expected {
            return Err(ProtocolError::UnknownSource {
                source_id,
                num_walkers: self.expected,
            });
        }
        if !self.seen.insert(source_id) {
            return Err(ProtocolError::DuplicateReport { source_id });
        }

        self.log.push(incoming.message);
        self.received += 1;
        Ok(())
    }
}

/// Result of a completed receive loop
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub expected: usize,
    pub received: usize,
    pub log: Vec<CompletionMessage>,
    pub elapsed: Duration,
}

/// The rank-0 participant
#[derive(Debug, Clone)]
pub struct Coordinator {
    topology: Topology,
    quiet: bool,
}

impl Coordinator {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            quiet: false,
        }
    }

    /// Suppress console report lines
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Report how many walkers the run waits for
    ///
    /// Launch code calls this before any walker starts, so the line precedes
    /// every walker's output.
    pub fn announce(&self) {
        let expected = self.topology.num_walkers();
        if expected == 0 {
            info!("no walkers to wait for");
            if !self.quiet {
                crate::output::text::print_no_walkers();
            }
        } else {
            info!(walkers = expected, "waiting for walkers");
            if !self.quiet {
                crate::output::text::print_waiting(expected);
            }
        }
    }

    /// Receive until every walker has reported, then release them
    ///
    /// # Errors
    ///
    /// - [`WalkError::Transport`] if a receive fails or every sender disconnects early
    /// - [`WalkError::Protocol`] if a message breaks the exactly-once contract
    pub fn run<I: Inbox + ?Sized>(&self, inbox: &mut I) -> WalkResult<CompletionSummary> {
        let start = Instant::now();
        let mut state = CoordinatorState::new(self.topology.num_walkers());

        while !state.is_complete() {
            let incoming = inbox.receive_from_any().map_err(|e| match e {
                TransportError::Disconnected { .. } => TransportError::Disconnected {
                    outstanding: state.outstanding(),
                },
                other => other,
            })?;

            state.accept(incoming)?;

            debug!(
                source = incoming.source,
                steps = incoming.message.steps_taken,
                received = state.received_count(),
                expected = state.expected_count(),
                "completion received"
            );
            if !self.quiet {
                crate::output::text::print_received(&incoming.message);
            }
        }

        inbox.finalize().map_err(WalkError::from)?;

        let summary = CompletionSummary {
            expected: state.expected_count(),
            received: state.received_count(),
            log: state.log().to_vec(),
            elapsed: start.elapsed(),
        };

        info!(received = summary.received, elapsed_ms = summary.elapsed.as_millis() as u64, "all walkers finished");
        if !self.quiet && summary.expected > 0 {
            crate::output::text::print_all_finished(&summary);
        }

        Ok(summary)
    }
}
