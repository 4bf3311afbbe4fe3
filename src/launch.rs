//! Launch topology
//!
//! Brings up the N+1 participants of a run and tears them down together.
//!
//! - **Standalone**: the coordinator runs on the calling thread and every walker
//!   gets its own OS thread. All of them share one channel transport. Walker
//!   threads are joined after the coordinator's loop ends, which is the joint
//!   shutdown point.
//! - **Coordinator process**: rank 0 binds a TCP inbox and runs the same loop.
//! - **Walker process**: one rank connects to the coordinator, walks, reports,
//!   and waits for FINALIZE.

use anyhow::{Context, Result};
use std::thread;
use tracing::{debug, info};

use crate::config::{LaunchParams, RunConfig, Topology};
use crate::coordinator::{CompletionSummary, Coordinator};
use crate::step::seed::SeedPlan;
use crate::step::StepSource;
use crate::transport::{channel_pair, Endpoint, TcpEndpoint, TcpInbox};
use crate::walker::{run_walker, WalkOutcome};

/// Result of a standalone run
#[derive(Debug, Clone)]
pub struct StandaloneRun {
    pub summary: CompletionSummary,
    /// Walker outcomes in rank order
    pub outcomes: Vec<WalkOutcome>,
}

/// Run every participant as a thread, with fair coins seeded from `seeds`
pub fn run_standalone(params: LaunchParams, topology: Topology, seeds: SeedPlan, quiet: bool) -> Result<StandaloneRun> {
    info!(base_seed = seeds.base(), "seed plan");
    run_standalone_with(params, topology, quiet, move |walker_id| seeds.coin_for(walker_id))
}

/// Run every participant as a thread, with a caller-chosen step source per rank
pub fn run_standalone_with<F, S>(params: LaunchParams, topology: Topology, quiet: bool, make_source: F) -> Result<StandaloneRun>
where
    F: Fn(u32) -> S,
    S: StepSource + 'static,
{
    let coordinator = Coordinator::new(topology).quiet(quiet);
    coordinator.announce();

    let (mut inbox, endpoints) = channel_pair(topology.num_walkers());

    let mut handles = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let walker_id = endpoint.rank();
        let config = params.walker(walker_id);
        let source = make_source(walker_id);

        let handle = thread::Builder::new()
            .name(format!("walker-{}", walker_id))
            .spawn(move || run_walker(config, source, endpoint, quiet))
            .with_context(|| format!("Failed to spawn walker {}", walker_id))?;

        handles.push((walker_id, handle));
    }
    debug!(walkers = handles.len(), "walker threads spawned");

    let result = coordinator.run(&mut inbox);
    drop(inbox);

    // Joint shutdown: every walker thread is accounted for before returning
    let mut outcomes = Vec::with_capacity(handles.len());
    for (walker_id, handle) in handles {
        let outcome = handle
            .join()
            .map_err(|_| anyhow::anyhow!("Walker {} thread panicked", walker_id))?
            .with_context(|| format!("Walker {} failed", walker_id))?;
        outcomes.push(outcome);
    }

    let summary = result.context("Coordinator failed")?;
    Ok(StandaloneRun { summary, outcomes })
}

/// Run rank 0 as a TCP coordinator process
pub fn run_coordinator_process(run: &RunConfig) -> Result<CompletionSummary> {
    let mut inbox = TcpInbox::bind(&run.network.listen)
        .with_context(|| format!("Failed to bind coordinator on {}", run.network.listen))?;

    if !run.output.quiet {
        println!("Coordinator listening on {}", inbox.local_addr());
    }

    let coordinator = Coordinator::new(run.topology).quiet(run.output.quiet);
    coordinator.announce();
    let summary = coordinator.run(&mut inbox).context("Coordinator failed")?;

    Ok(summary)
}

/// Run one walker as a TCP walker process
pub fn run_walker_process(run: &RunConfig, walker_id: u32) -> Result<WalkOutcome> {
    let seeds = SeedPlan::from_option(run.seed);

    let endpoint = TcpEndpoint::connect(
        &run.network.connect,
        walker_id,
        run.network.connect_attempts,
        run.network.connect_backoff(),
    )
    .with_context(|| format!("Walker {} could not reach the coordinator", walker_id))?;

    let outcome = run_walker(
        run.params.walker(walker_id),
        seeds.coin_for(walker_id),
        endpoint,
        run.output.quiet,
    )
    .with_context(|| format!("Walker {} failed", walker_id))?;

    Ok(outcome)
}
