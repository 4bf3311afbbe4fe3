//! Walker implementation
//!
//! A walker runs one discrete random walk on the integer line and reports the
//! outcome to the coordinator exactly once.
//!
//! # Lifecycle
//!
//! ```text
//! Running -> {OutOfBounds | StepLimitReached} -> Reported -> Terminated
//! ```
//!
//! 1. **Running**: draw `-1`/`+1`, move, count the step. Continue while
//!    `steps_taken < max_steps` and `|position| <= domain_bound`.
//! 2. **Stopped**: the first condition to fail decides the [`Termination`] cause.
//! 3. **Reported**: one [`CompletionMessage`] goes to the coordinator. The
//!    endpoint is consumed by the send, so a second report cannot be written.
//! 4. **Terminated**: the walker waits for the joint shutdown and returns.
//!
//! # Example
//!
//! ```
//! use randwalk::config::WalkerConfig;
//! use randwalk::step::scripted::ScriptedSteps;
//! use randwalk::walker::{Termination, Walker};
//!
//! let config = WalkerConfig::new(1, 3, 100);
//! let mut walker = Walker::new(config, ScriptedSteps::constant(1));
//! let outcome = walker.walk();
//!
//! assert_eq!(outcome.steps_taken, 4);
//! assert_eq!(outcome.cause, Termination::OutOfBounds);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::config::WalkerConfig;
use crate::error::TransportError;
use crate::protocol::CompletionMessage;
use crate::step::StepSource;
use crate::transport::Endpoint;

/// Why a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// `|position|` exceeded the domain bound before the step limit
    OutOfBounds,
    /// `max_steps` taken while still inside the domain
    StepLimitReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::OutOfBounds => write!(f, "out of bounds"),
            Termination::StepLimitReached => write!(f, "max steps reached"),
        }
    }
}

/// Mutable walk state, owned by exactly one walker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkerState {
    pub position: i64,
    pub steps_taken: u64,
}

/// Final state of a finished walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    pub walker_id: u32,
    pub steps_taken: u64,
    pub final_position: i64,
    pub cause: Termination,
}

impl WalkOutcome {
    /// The wire message for this outcome
    pub fn completion(&self) -> CompletionMessage {
        CompletionMessage::new(self.walker_id, self.steps_taken)
    }
}

/// One random walk
pub struct Walker<S: StepSource> {
    config: WalkerConfig,
    source: S,
    state: WalkerState,
}

impl<S: StepSource> Walker<S> {
    /// Create a walker at position 0 with no steps taken
    pub fn new(config: WalkerConfig, source: S) -> Self {
        Self {
            config,
            source,
            state: WalkerState::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> WalkerState {
        self.state
    }

    /// Whether the walk is still running
    #[inline]
    fn in_bounds(&self) -> bool {
        self.state.position.unsigned_abs() <= self.config.domain_bound
    }

    /// Take one step
    #[inline]
    fn step(&mut self) {
        self.state.position += self.source.next_step();
        self.state.steps_taken += 1;
    }

    /// Run the walk to its stopping condition
    pub fn walk(&mut self) -> WalkOutcome {
        while self.state.steps_taken < self.config.max_steps && self.in_bounds() {
            self.step();
        }

        let cause = if self.in_bounds() {
            Termination::StepLimitReached
        } else {
            Termination::OutOfBounds
        };

        WalkOutcome {
            walker_id: self.config.walker_id,
            steps_taken: self.state.steps_taken,
            final_position: self.state.position,
            cause,
        }
    }
}

/// Walk, report once, then wait for the joint shutdown
///
/// Takes the endpoint by value: once this returns the walker has no way to
/// send again.
///
/// # Errors
///
/// Returns [`TransportError`] if the completion cannot be delivered or the
/// shutdown handshake fails. Neither is retried.
pub fn run_walker<S, E>(config: WalkerConfig, source: S, mut endpoint: E, quiet: bool) -> Result<WalkOutcome, TransportError>
where
    S: StepSource,
    E: Endpoint,
{
    debug!(
        walker_id = config.walker_id,
        domain_bound = config.domain_bound,
        max_steps = config.max_steps,
        "walker starting"
    );

    let mut walker = Walker::new(config, source);
    let outcome = walker.walk();

    info!(
        walker_id = outcome.walker_id,
        steps = outcome.steps_taken,
        position = outcome.final_position,
        cause = %outcome.cause,
        "walk finished"
    );
    if !quiet {
        crate::output::text::print_walker_finished(&outcome);
    }

    endpoint.send(outcome.completion())?;
    endpoint.finalize()?;

    Ok(outcome)
}
