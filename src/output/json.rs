//! JSON output formatting
//!
//! Writes a summary of a completed run: launch parameters, the expected and
//! received completion counts, and the completion log in arrival order.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::config::{LaunchParams, Topology};
use crate::coordinator::CompletionSummary;
use crate::protocol::PROTOCOL_VERSION;
use crate::Result;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        let micros = d.as_micros() as u64;
        let human = format_duration_human(d);
        Self { micros, human }
    }
}

/// One received completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCompletion {
    /// Position in arrival order (0-based)
    pub arrival: usize,
    pub source_id: u32,
    pub steps_taken: u64,
}

/// Summary of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunReport {
    pub version: String,
    pub protocol_version: u32,
    pub generated_at: String,
    pub domain_bound: u64,
    pub max_steps: u64,
    pub participants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub expected: usize,
    pub received: usize,
    pub elapsed: JsonDuration,
    pub completions: Vec<JsonCompletion>,
}

impl JsonRunReport {
    pub fn new(params: &LaunchParams, topology: &Topology, seed: Option<u64>, summary: &CompletionSummary) -> Self {
        let completions = summary
            .log
            .iter()
            .enumerate()
            .map(|(arrival, m)| JsonCompletion {
                arrival,
                source_id: m.source_id,
                steps_taken: m.steps_taken,
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: PROTOCOL_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            domain_bound: params.domain_bound,
            max_steps: params.max_steps,
            participants: topology.participants,
            seed,
            expected: summary.expected,
            received: summary.received,
            elapsed: JsonDuration::from_duration(summary.elapsed),
            completions,
        }
    }
}

/// Write the run report to a file
pub fn write_json_output(output_path: &Path, report: &JsonRunReport, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output: {}", output_path.display()))?;

    if pretty {
        serde_json::to_writer_pretty(file, report)?;
    } else {
        serde_json::to_writer(file, report)?;
    }

    Ok(())
}

/// Format duration in human-readable format
fn format_duration_human(d: Duration) -> String {
    let micros = d.as_micros() as u64;

    if micros == 0 {
        return "0µs".to_string();
    }

    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.3}ms", micros as f64 / 1000.0)
    } else if micros < 60_000_000 {
        format!("{:.3}s", micros as f64 / 1_000_000.0)
    } else {
        format!("{:.2}m", micros as f64 / 60_000_000.0)
    }
}
