//! Integration tests for randwalk
//!
//! Process-per-participant runs are exercised over loopback TCP with walker
//! threads standing in for walker processes.

use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

use clap::Parser;
use randwalk::config::cli::Cli;
use randwalk::config::{LaunchParams, RunConfig, Topology};
use randwalk::coordinator::Coordinator;
use randwalk::error::{ConfigError, WalkError};
use randwalk::launch::{run_standalone, run_standalone_with};
use randwalk::output::json::{write_json_output, JsonRunReport};
use randwalk::step::scripted::ScriptedSteps;
use randwalk::step::seed::SeedPlan;
use randwalk::transport::{Endpoint, Inbox, TcpEndpoint, TcpInbox};
use randwalk::walker::{run_walker, Termination};
use randwalk::CompletionMessage;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["randwalk"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_standalone_counts_every_walker() {
    let params = LaunchParams {
        domain_bound: 10,
        max_steps: 1000,
    };
    let run = run_standalone(params, Topology::new(17), SeedPlan::fixed(2024), true).unwrap();

    assert_eq!(run.summary.expected, 16);
    assert_eq!(run.summary.received, 16);
    assert_eq!(run.outcomes.len(), 16);

    let mut ids: Vec<u32> = run.summary.log.iter().map(|m| m.source_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=16).collect::<Vec<u32>>());

    for outcome in &run.outcomes {
        assert!(outcome.steps_taken >= 1 && outcome.steps_taken <= params.max_steps);
        if outcome.steps_taken < params.max_steps {
            assert_eq!(outcome.cause, Termination::OutOfBounds);
        }
    }
}

#[test]
fn test_fixed_seed_is_reproducible() {
    let params = LaunchParams {
        domain_bound: 4,
        max_steps: 300,
    };
    let a = run_standalone(params, Topology::with_walkers(6), SeedPlan::fixed(99), true).unwrap();
    let b = run_standalone(params, Topology::with_walkers(6), SeedPlan::fixed(99), true).unwrap();

    // Arrival order may differ; per-walker outcomes may not
    assert_eq!(a.outcomes, b.outcomes);
}

#[test]
fn test_scripted_four_walker_scenario() {
    let params = LaunchParams {
        domain_bound: 3,
        max_steps: 100,
    };
    let run = run_standalone_with(params, Topology::new(5), true, |id| match id {
        1 => ScriptedSteps::constant(1),
        2 => ScriptedSteps::alternating(),
        3 => ScriptedSteps::constant(-1),
        _ => ScriptedSteps::new(vec![1, -1, 1, 1, 1]).unwrap(),
    })
    .unwrap();

    assert_eq!(run.summary.received, 4);

    let steps: Vec<u64> = run.outcomes.iter().map(|o| o.steps_taken).collect();
    assert_eq!(steps[0], 4);
    assert_eq!(steps[1], 100);
    assert_eq!(steps[2], 4);

    for outcome in &run.outcomes {
        assert!(run.summary.log.contains(&outcome.completion()));
    }
}

#[test]
fn test_single_participant_has_no_walkers() {
    let params = LaunchParams {
        domain_bound: 3,
        max_steps: 100,
    };
    let run = run_standalone(params, Topology::new(1), SeedPlan::fixed(0), true).unwrap();
    assert_eq!(run.summary.expected, 0);
    assert!(run.summary.log.is_empty());
}

#[test]
fn test_tcp_coordinator_with_walker_threads() {
    let mut inbox = TcpInbox::bind("127.0.0.1:0").unwrap();
    let addr = inbox.local_addr().to_string();
    let params = LaunchParams {
        domain_bound: 3,
        max_steps: 100,
    };
    let topology = Topology::with_walkers(3);

    let walkers: Vec<_> = topology
        .walker_ids()
        .map(|id| {
            let addr = addr.clone();
            thread::spawn(move || {
                let endpoint = TcpEndpoint::connect(&addr, id, 10, Duration::from_millis(10)).unwrap();
                run_walker(params.walker(id), ScriptedSteps::constant(1), endpoint, true).unwrap()
            })
        })
        .collect();

    let summary = Coordinator::new(topology).quiet(true).run(&mut inbox).unwrap();
    assert_eq!(summary.received, 3);

    // Walkers only return after FINALIZE
    for handle in walkers {
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.steps_taken, 4);
    }
}

#[test]
fn test_tcp_duplicate_report_is_rejected() {
    let mut inbox = TcpInbox::bind("127.0.0.1:0").unwrap();
    let addr = inbox.local_addr().to_string();

    // Two connections both claiming rank 1
    let senders: Vec<_> = (0..2)
        .map(|_| {
            let addr = addr.clone();
            thread::spawn(move || {
                let mut endpoint = TcpEndpoint::connect(&addr, 1, 10, Duration::from_millis(10)).unwrap();
                endpoint.send(CompletionMessage::new(1, 7)).unwrap();
            })
        })
        .collect();
    for handle in senders {
        handle.join().unwrap();
    }

    let err = Coordinator::new(Topology::with_walkers(2))
        .quiet(true)
        .run(&mut inbox)
        .unwrap_err();
    assert!(matches!(err, WalkError::Protocol(_)));

    inbox.finalize().unwrap();
}

#[test]
fn test_config_rejects_wrong_param_count() {
    let err = RunConfig::resolve(&cli(&["3"])).unwrap_err();
    assert!(err.is_usage());
    assert!(matches!(err, ConfigError::ParameterCount { expected: 2, got: 1 }));

    let err = RunConfig::resolve(&cli(&["3", "100", "7"])).unwrap_err();
    assert!(matches!(err, ConfigError::ParameterCount { got: 3, .. }));
}

#[test]
fn test_config_rejects_bad_values() {
    assert!(RunConfig::resolve(&cli(&["abc", "100"])).is_err());
    assert!(RunConfig::resolve(&cli(&["0", "100"])).is_err());
    assert!(RunConfig::resolve(&cli(&["3", "0"])).is_err());
    assert!(RunConfig::resolve(&cli(&["-3", "100"])).is_err());
}

#[test]
fn test_config_file_run_writes_report() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("walk.toml");
    let json_path = dir.path().join("report.json");
    std::fs::write(
        &config_path,
        format!(
            "[simulation]\ndomain_bound = 5\nmax_steps = 200\nparticipants = 4\nseed = 3\n\n[output]\nquiet = true\njson = {:?}\n",
            json_path.to_str().unwrap()
        ),
    )
    .unwrap();

    let run = RunConfig::resolve(&cli(&["--config", config_path.to_str().unwrap()])).unwrap();
    assert!(run.output.quiet);

    let result = run_standalone(run.params, run.topology, SeedPlan::from_option(run.seed), true).unwrap();
    let report = JsonRunReport::new(&run.params, &run.topology, run.seed, &result.summary);
    write_json_output(run.output.json.as_deref().unwrap(), &report, true).unwrap();

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["expected"], 3);
    assert_eq!(value["received"], 3);
    assert_eq!(value["seed"], 3);
    assert_eq!(value["completions"].as_array().unwrap().len(), 3);
}

/// Run the built binary with a clean environment for randwalk settings
fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_randwalk"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("RANDWALK_PARTICIPANTS")
        .env_remove("RANDWALK_RANK")
        .output()
        .unwrap()
}

#[test]
fn test_binary_usage_error_from_coordinator_role() {
    let out = run_binary(&["3"]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr.contains("expected 2 launch parameters"));
    assert!(stderr.contains("Usage: randwalk"));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_binary_usage_error_is_silent_in_walker_role() {
    let out = run_binary(&["--mode", "walker", "--rank", "1", "3"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stderr.is_empty());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_binary_bad_value_is_usage_error() {
    let out = run_binary(&["three", "100"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage: randwalk"));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_binary_valid_run_succeeds() {
    let out = run_binary(&["-n", "5", "--seed", "4", "3", "100"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("all 4 walkers have finished"));
    assert_eq!(stdout.matches("reported completion").count(), 4);
}

#[test]
fn test_binary_waiting_line_precedes_walker_output() {
    let out = run_binary(&["-n", "9", "--seed", "8", "2", "50"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success());

    let lines: Vec<&str> = stdout.lines().collect();
    let waiting = lines
        .iter()
        .position(|l| l.contains("waiting for 8 walker(s)"))
        .unwrap();
    let first_walker = lines.iter().position(|l| l.starts_with("Walker ")).unwrap();
    assert!(waiting < first_walker);
}

#[test]
fn test_binary_no_walkers() {
    let out = run_binary(&["-n", "1", "3", "100"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("no walkers to wait for"));
}
