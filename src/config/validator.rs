//! Configuration validation

use super::cli::ExecutionMode;
use super::{LaunchParams, RunConfig, Topology};
use crate::error::ConfigError;

/// Validate a resolved run configuration
pub fn validate_run_config(run: &RunConfig) -> Result<(), ConfigError> {
    validate_params(&run.params)?;
    validate_topology(&run.topology)?;

    if run.mode == ExecutionMode::Walker {
        validate_walker_rank(run.rank, &run.topology)?;
    }

    Ok(())
}

/// Validate launch parameters
pub fn validate_params(params: &LaunchParams) -> Result<(), ConfigError> {
    if params.domain_bound == 0 {
        return Err(ConfigError::OutOfRange {
            name: "domain_bound",
            constraint: "a positive integer",
            value: 0,
        });
    }

    // Positions are i64; a bound beyond that range could never be exceeded
    if params.domain_bound >= i64::MAX as u64 {
        return Err(ConfigError::OutOfRange {
            name: "domain_bound",
            constraint: "below 2^63 - 1",
            value: params.domain_bound,
        });
    }

    if params.max_steps == 0 {
        return Err(ConfigError::OutOfRange {
            name: "max_steps",
            constraint: "a positive integer",
            value: 0,
        });
    }

    Ok(())
}

/// Validate the participant count
pub fn validate_topology(topology: &Topology) -> Result<(), ConfigError> {
    if topology.participants == 0 {
        return Err(ConfigError::OutOfRange {
            name: "participants",
            constraint: "at least 1 (the coordinator)",
            value: 0,
        });
    }

    if topology.num_walkers() > u32::MAX as usize {
        return Err(ConfigError::OutOfRange {
            name: "participants",
            constraint: "at most 2^32",
            value: topology.participants as u64,
        });
    }

    Ok(())
}

/// Validate a walker's rank against the topology
pub fn validate_walker_rank(rank: Option<u32>, topology: &Topology) -> Result<(), ConfigError> {
    let rank = rank.ok_or(ConfigError::Missing("--rank"))?;

    if rank == 0 || rank as usize > topology.num_walkers() {
        return Err(ConfigError::OutOfRange {
            name: "rank",
            constraint: "between 1 and participants - 1",
            value: rank as u64,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(domain_bound: u64, max_steps: u64) -> LaunchParams {
        LaunchParams {
            domain_bound,
            max_steps,
        }
    }

    #[test]
    fn test_valid_params() {
        assert!(validate_params(&params(3, 100)).is_ok());
        assert!(validate_params(&params(1, 1)).is_ok());
    }

    #[test]
    fn test_zero_params_rejected() {
        assert!(validate_params(&params(0, 100)).is_err());
        assert!(validate_params(&params(3, 0)).is_err());
    }

    #[test]
    fn test_huge_bound_rejected() {
        assert!(validate_params(&params(u64::MAX, 10)).is_err());
    }

    #[test]
    fn test_topology() {
        assert!(validate_topology(&Topology::new(1)).is_ok());
        assert!(validate_topology(&Topology::new(0)).is_err());
    }

    #[test]
    fn test_walker_rank() {
        let topo = Topology::new(4);
        assert!(validate_walker_rank(Some(1), &topo).is_ok());
        assert!(validate_walker_rank(Some(3), &topo).is_ok());
        assert!(validate_walker_rank(Some(0), &topo).is_err());
        assert!(validate_walker_rank(Some(4), &topo).is_err());
        assert!(matches!(
            validate_walker_rank(None, &topo),
            Err(ConfigError::Missing("--rank"))
        ));
    }
}
