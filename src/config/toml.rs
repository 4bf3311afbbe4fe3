//! TOML configuration file parsing
//!
//! ```toml
//! [simulation]
//! domain_bound = 10
//! max_steps = 1000
//! participants = 9
//! seed = 42
//!
//! [network]
//! listen = "0.0.0.0:7070"
//! connect = "10.0.1.10:7070"
//! connect_attempts = 20
//! connect_backoff_ms = 100
//!
//! [output]
//! quiet = false
//! json = "run.json"
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::parse_duration;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_toml_string(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config, ::toml::de::Error> {
    ::toml::from_str(contents)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
///
/// Positional launch parameters are resolved separately, since their count is
/// part of the usage check.
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config, ConfigError> {
    if let Some(participants) = cli.participants {
        config.simulation.participants = participants;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    if let Some(ref listen) = cli.listen {
        config.network.listen = listen.clone();
    }
    if let Some(ref connect) = cli.connect {
        config.network.connect = connect.clone();
    }
    if let Some(attempts) = cli.connect_attempts {
        config.network.connect_attempts = attempts;
    }
    if let Some(ref backoff) = cli.connect_backoff {
        config.network.connect_backoff_ms = parse_duration(backoff)?.as_millis() as u64;
    }

    if cli.quiet {
        config.output.quiet = true;
    }
    if let Some(ref json) = cli.json {
        config.output.json = Some(json.clone());
    }

    Ok(config)
}
