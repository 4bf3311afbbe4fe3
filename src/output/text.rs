//! Human-readable console output
//!
//! These lines are for people watching a run. The protocol never depends on
//! them, and `--quiet` turns them off.

use crate::coordinator::CompletionSummary;
use crate::protocol::CompletionMessage;
use crate::walker::WalkOutcome;

/// Walker finished its walk (printed by the walker itself)
pub fn print_walker_finished(outcome: &WalkOutcome) {
    println!("{}", walker_finished_line(outcome));
}

/// Coordinator is about to wait for walkers
pub fn print_waiting(num_walkers: usize) {
    println!("Coordinator: waiting for {} walker(s) to finish...", num_walkers);
}

/// Degenerate run with no walkers
pub fn print_no_walkers() {
    println!("Coordinator: no walkers to wait for.");
}

/// Coordinator accepted one completion
pub fn print_received(message: &CompletionMessage) {
    println!("{}", received_line(message));
}

/// Final aggregate line
pub fn print_all_finished(summary: &CompletionSummary) {
    println!("{}", all_finished_line(summary));
}

pub fn walker_finished_line(outcome: &WalkOutcome) -> String {
    format!(
        "Walker {}: finished after {} steps ({}).",
        outcome.walker_id, outcome.steps_taken, outcome.cause
    )
}

pub fn received_line(message: &CompletionMessage) -> String {
    format!(
        "Coordinator: walker {} reported completion after {} steps.",
        message.source_id, message.steps_taken
    )
}

pub fn all_finished_line(summary: &CompletionSummary) -> String {
    format!(
        "Coordinator: all {} walkers have finished ({:.3}s).",
        summary.received,
        summary.elapsed.as_secs_f64()
    )
}
