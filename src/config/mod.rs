//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! Launch parameters are resolved once at startup into an immutable
//! [`RunConfig`]. Every walker gets its own copy of a [`WalkerConfig`] and the
//! coordinator gets the [`Topology`]; nothing is shared or mutated afterwards.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use cli::{Cli, ExecutionMode};

/// Configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Half-width of the domain `[-domain_bound, +domain_bound]`
    pub domain_bound: Option<u64>,
    /// Hard cap on steps per walker
    pub max_steps: Option<u64>,
    /// Participants including the coordinator
    #[serde(default = "default_participants")]
    pub participants: usize,
    /// Base seed (wall clock when absent)
    pub seed: Option<u64>,
}

fn default_participants() -> usize {
    5
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            domain_bound: None,
            max_steps: None,
            participants: default_participants(),
            seed: None,
        }
    }
}

/// Network settings for process-per-participant runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Coordinator listen address
    #[serde(default = "default_addr")]
    pub listen: String,
    /// Address walkers connect to
    #[serde(default = "default_addr")]
    pub connect: String,
    /// Connection attempts before a walker gives up
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Initial wait between connection attempts (milliseconds)
    #[serde(default = "default_connect_backoff_ms")]
    pub connect_backoff_ms: u64,
}

fn default_addr() -> String {
    "127.0.0.1:7070".to_string()
}

fn default_connect_attempts() -> u32 {
    20
}

fn default_connect_backoff_ms() -> u64 {
    100
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen: default_addr(),
            connect: default_addr(),
            connect_attempts: default_connect_attempts(),
            connect_backoff_ms: default_connect_backoff_ms(),
        }
    }
}

impl NetworkConfig {
    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suppress console report lines
    #[serde(default)]
    pub quiet: bool,
    /// JSON summary path
    pub json: Option<PathBuf>,
}

/// Launch parameters shared by every participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub domain_bound: u64,
    pub max_steps: u64,
}

impl LaunchParams {
    /// Per-walker configuration for one rank
    pub fn walker(&self, walker_id: u32) -> WalkerConfig {
        WalkerConfig::new(walker_id, self.domain_bound, self.max_steps)
    }
}

/// Immutable per-walker parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    pub walker_id: u32,
    pub domain_bound: u64,
    pub max_steps: u64,
}

impl WalkerConfig {
    pub fn new(walker_id: u32, domain_bound: u64, max_steps: u64) -> Self {
        Self {
            walker_id,
            domain_bound,
            max_steps,
        }
    }
}

/// Participants of a run: rank 0 coordinates, ranks `1..participants` walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub participants: usize,
}

impl Topology {
    pub fn new(participants: usize) -> Self {
        Self { participants }
    }

    /// Topology for an explicit number of walkers
    pub fn with_walkers(num_walkers: usize) -> Self {
        Self {
            participants: num_walkers + 1,
        }
    }

    /// Number of walkers, i.e. participants minus the coordinator
    pub fn num_walkers(&self) -> usize {
        self.participants.saturating_sub(1)
    }

    /// Walker ranks in launch order
    pub fn walker_ids(&self) -> impl Iterator<Item = u32> {
        1..=self.num_walkers() as u32
    }
}

/// Role of this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Walker(u32),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => write!(f, "coordinator (rank 0)"),
            Role::Walker(rank) => write!(f, "walker (rank {})", rank),
        }
    }
}

/// Fully resolved configuration for one process
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: ExecutionMode,
    pub params: LaunchParams,
    pub topology: Topology,
    pub rank: Option<u32>,
    pub seed: Option<u64>,
    pub network: NetworkConfig,
    pub output: OutputConfig,
}

impl RunConfig {
    /// Resolve CLI arguments (and an optional config file) into a validated run
    ///
    /// CLI values take precedence over the file. The positional parameter count
    /// must be exactly 2, or 0 when the file supplies both values.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => toml::parse_toml_file(path)?,
            None => Config::default(),
        };
        let config = toml::merge_cli_with_config(cli, file)?;

        let params = match cli_convert::parse_launch_params(&cli.params)? {
            Some((domain_bound, max_steps)) => LaunchParams {
                domain_bound,
                max_steps,
            },
            None => match (config.simulation.domain_bound, config.simulation.max_steps) {
                (Some(domain_bound), Some(max_steps)) if cli.config.is_some() => LaunchParams {
                    domain_bound,
                    max_steps,
                },
                _ => {
                    return Err(ConfigError::ParameterCount {
                        expected: cli_convert::LAUNCH_PARAM_COUNT,
                        got: 0,
                    })
                }
            },
        };

        let run = RunConfig {
            mode: cli.mode,
            params,
            topology: Topology::new(config.simulation.participants),
            rank: cli.rank,
            seed: config.simulation.seed,
            network: config.network,
            output: config.output,
        };

        validator::validate_run_config(&run)?;
        Ok(run)
    }

    /// Role this process plays
    pub fn role(&self) -> Role {
        match (self.mode, self.rank) {
            (ExecutionMode::Walker, Some(rank)) => Role::Walker(rank),
            _ => Role::Coordinator,
        }
    }
}
