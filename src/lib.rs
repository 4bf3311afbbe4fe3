//! randwalk - concurrent random walks with a completion-counting coordinator
//!
//! N walkers each run an independent one-dimensional random walk until it leaves
//! the domain `[-domain_bound, +domain_bound]` or hits `max_steps`. Each then
//! sends exactly one completion message. A single coordinator receives from any
//! walker, in arrival order, until it has counted exactly N completions.
//!
//! # Architecture
//!
//! - **Walkers**: isolated state, one step source each, one report each
//! - **Coordinator**: wildcard receive loop, terminates at `received == expected`
//! - **Transports**: crossbeam channel for threads, framed TCP for processes
//! - **Launch**: standalone (threads) or one process per participant
//!
//! # Example
//!
//! ```
//! use randwalk::config::{LaunchParams, Topology};
//! use randwalk::launch::run_standalone;
//! use randwalk::step::seed::SeedPlan;
//!
//! let params = LaunchParams { domain_bound: 5, max_steps: 200 };
//! let run = run_standalone(params, Topology::with_walkers(4), SeedPlan::fixed(1), true)?;
//! assert_eq!(run.summary.received, 4);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod launch;
pub mod output;
pub mod protocol;
pub mod step;
pub mod transport;
pub mod walker;

// Re-export commonly used types
pub use config::{Config, LaunchParams, RunConfig, Topology, WalkerConfig};
pub use coordinator::{CompletionSummary, Coordinator, CoordinatorState};
pub use error::{ConfigError, ProtocolError, TransportError, WalkError};
pub use protocol::CompletionMessage;
pub use walker::{Termination, WalkOutcome, Walker};

/// Result type used throughout randwalk
pub type Result<T> = anyhow::Result<T>;
