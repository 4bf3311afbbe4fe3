//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Standalone mode (default) - coordinator and walkers as threads in one process
    Standalone,
    /// Coordinator mode - rank 0, waits for walker processes over TCP
    Coordinator,
    /// Walker mode - one walker process that reports to a coordinator over TCP
    Walker,
}

impl ExecutionMode {
    /// Whether this process plays the coordinator role
    pub fn is_coordinator(&self) -> bool {
        matches!(self, ExecutionMode::Standalone | ExecutionMode::Coordinator)
    }
}

/// randwalk - concurrent random walks with a completion-counting coordinator
#[derive(Parser, Debug)]
#[command(name = "randwalk")]
#[command(version, about, long_about = None)]
#[command(override_usage = "randwalk [OPTIONS] <domain_bound> <max_steps>")]
pub struct Cli {
    /// Execution mode: standalone, coordinator, or walker
    #[arg(long, value_enum, default_value = "standalone")]
    pub mode: ExecutionMode,

    /// Total participants including the coordinator (walkers = participants - 1)
    #[arg(short = 'n', long, env = "RANDWALK_PARTICIPANTS")]
    pub participants: Option<usize>,

    /// Rank of this walker (walker mode only, 1..participants)
    #[arg(long, env = "RANDWALK_RANK")]
    pub rank: Option<u32>,

    /// Address the coordinator listens on (coordinator mode)
    #[arg(long)]
    pub listen: Option<String>,

    /// Coordinator address to report to (walker mode)
    #[arg(long)]
    pub connect: Option<String>,

    /// Connection attempts before a walker gives up (walker mode)
    #[arg(long)]
    pub connect_attempts: Option<u32>,

    /// Initial wait between connection attempts (e.g., 100ms, 1s)
    #[arg(long)]
    pub connect_backoff: Option<String>,

    /// Base seed for the run (default: wall clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Write a JSON summary to this path (coordinator roles only)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Suppress console report lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Launch parameters: <domain_bound> <max_steps>
    ///
    /// Collected raw so that a wrong count is reported by the coordinator role
    /// instead of by every process.
    #[arg(value_name = "PARAM", allow_negative_numbers = true)]
    pub params: Vec<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Usage line printed on a configuration error
pub fn usage() -> String {
    "Usage: randwalk [--mode standalone|coordinator|walker] [-n <participants>] <domain_bound> <max_steps>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["randwalk", "10", "1000"]).unwrap();
        assert_eq!(cli.mode, ExecutionMode::Standalone);
        assert_eq!(cli.params, vec!["10", "1000"]);
        assert!(cli.participants.is_none());
    }

    #[test]
    fn test_parse_wrong_count_is_not_a_clap_error() {
        let cli = Cli::try_parse_from(["randwalk", "10"]).unwrap();
        assert_eq!(cli.params.len(), 1);

        let cli = Cli::try_parse_from(["randwalk", "1", "2", "3"]).unwrap();
        assert_eq!(cli.params.len(), 3);
    }

    #[test]
    fn test_parse_negative_param() {
        let cli = Cli::try_parse_from(["randwalk", "-3", "100"]).unwrap();
        assert_eq!(cli.params, vec!["-3", "100"]);
    }

    #[test]
    fn test_parse_walker_mode() {
        let cli = Cli::try_parse_from([
            "randwalk",
            "--mode",
            "walker",
            "--rank",
            "2",
            "-n",
            "5",
            "--connect",
            "127.0.0.1:7070",
            "5",
            "50",
        ])
        .unwrap();
        assert_eq!(cli.mode, ExecutionMode::Walker);
        assert_eq!(cli.rank, Some(2));
        assert_eq!(cli.participants, Some(5));
        assert!(!cli.mode.is_coordinator());
    }

    #[test]
    fn test_parse_flags_after_params() {
        let cli = Cli::try_parse_from(["randwalk", "3", "100", "-q", "--seed", "9"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.params.len(), 2);
    }
}
