//! CLI to Config conversion utilities

use crate::error::ConfigError;
use std::time::Duration;

/// Number of positional launch parameters
pub const LAUNCH_PARAM_COUNT: usize = 2;

/// Parse a positive integer launch parameter
pub fn parse_positive(name: &'static str, s: &str) -> Result<u64, ConfigError> {
    let value: u64 = s.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: s.to_string(),
    })?;

    if value == 0 {
        return Err(ConfigError::OutOfRange {
            name,
            constraint: "a positive integer",
            value,
        });
    }

    Ok(value)
}

/// Split raw positional parameters into `(domain_bound, max_steps)`
///
/// `None` means no positional parameters were given at all, which is only
/// acceptable when a config file supplies both values.
pub fn parse_launch_params(params: &[String]) -> Result<Option<(u64, u64)>, ConfigError> {
    match params {
        [] => Ok(None),
        [domain_bound, max_steps] => Ok(Some((
            parse_positive("domain_bound", domain_bound)?,
            parse_positive("max_steps", max_steps)?,
        ))),
        other => Err(ConfigError::ParameterCount {
            expected: LAUNCH_PARAM_COUNT,
            got: other.len(),
        }),
    }
}

/// Parse a duration string (e.g., "250ms", "2s") into a Duration
///
/// A bare number is taken as milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim().to_lowercase();

    let (num_str, to_duration): (&str, fn(u64) -> Duration) = if let Some(n) = s.strip_suffix("ms") {
        (n, Duration::from_millis)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, Duration::from_secs)
    } else {
        (s.as_str(), Duration::from_millis)
    };

    let num: u64 = num_str.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: "duration",
        value: s.clone(),
    })?;

    Ok(to_duration(num))
}
