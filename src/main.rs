//! randwalk CLI entry point

use anyhow::{Context, Result};
use randwalk::config::cli::{usage, Cli, ExecutionMode};
use randwalk::config::{Role, RunConfig};
use randwalk::coordinator::CompletionSummary;
use randwalk::error::ConfigError;
use randwalk::launch;
use randwalk::output::json::{write_json_output, JsonRunReport};
use randwalk::step::seed::SeedPlan;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Exit code for malformed launch parameters
const EXIT_USAGE: u8 = 1;

/// Exit code for a run that started and then failed
const EXIT_RUNTIME: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_logging(cli.verbose);

    // Launch parameters are checked before any walker or coordinator logic runs
    let run = match RunConfig::resolve(&cli) {
        Ok(run) => run,
        Err(e) => return report_config_error(cli.mode, &e),
    };
    debug!(?run, "resolved configuration");

    match dispatch(&run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_RUNTIME)
        }
    }
}

/// Report a configuration error from the coordinator role only
///
/// Every participant sees the same parameters and fails the same check, so all
/// of them exit here. Only rank 0 prints.
fn report_config_error(mode: ExecutionMode, err: &ConfigError) -> ExitCode {
    if mode.is_coordinator() {
        eprintln!("Error: {}", err);
        if err.is_usage() {
            eprintln!("{}", usage());
        }
    } else {
        debug!(error = %err, "configuration error, exiting");
    }
    ExitCode::from(EXIT_USAGE)
}

fn dispatch(run: &RunConfig) -> Result<()> {
    match (run.mode, run.role()) {
        (ExecutionMode::Standalone, _) => run_standalone(run),
        (ExecutionMode::Coordinator, _) => {
            let summary = launch::run_coordinator_process(run)?;
            write_report(run, &summary)
        }
        (ExecutionMode::Walker, Role::Walker(rank)) => {
            launch::run_walker_process(run, rank)?;
            Ok(())
        }
        (ExecutionMode::Walker, Role::Coordinator) => {
            // validate_run_config guarantees a rank in walker mode
            anyhow::bail!("walker mode without a rank")
        }
    }
}

/// Run all participants as threads in this process
fn run_standalone(run: &RunConfig) -> Result<()> {
    let quiet = run.output.quiet;
    if !quiet {
        println!("randwalk v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Domain: [-{}, +{}], max steps: {}, walkers: {}",
            run.params.domain_bound,
            run.params.domain_bound,
            run.params.max_steps,
            run.topology.num_walkers()
        );
        println!();
    }

    let result = launch::run_standalone(run.params, run.topology, SeedPlan::from_option(run.seed), quiet)?;
    write_report(run, &result.summary)
}

fn write_report(run: &RunConfig, summary: &CompletionSummary) -> Result<()> {
    if let Some(ref path) = run.output.json {
        let report = JsonRunReport::new(&run.params, &run.topology, run.seed, summary);
        write_json_output(path, &report, true).context("Failed to write JSON report")?;
        if !run.output.quiet {
            println!("Report written to {}", path.display());
        }
    }
    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else if verbose {
        EnvFilter::new("randwalk=debug,warn")
    } else {
        EnvFilter::new("randwalk=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .init();
}
