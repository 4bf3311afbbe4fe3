//! Scripted step source
//!
//! Replays a fixed list of moves, wrapping around when the list is exhausted.
//! Useful for pinning a walker to a known path, e.g. `[+1, -1]` never leaves
//! `[-1, 1]` and `[+1]` marches straight out of bounds.

use super::StepSource;
use anyhow::Result;

/// Cyclic replay of a fixed move list
#[derive(Debug, Clone)]
pub struct ScriptedSteps {
    moves: Vec<i64>,
    cursor: usize,
}

impl ScriptedSteps {
    /// Create a scripted source
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or holds anything other than `-1`/`+1`.
    pub fn new(moves: Vec<i64>) -> Result<Self> {
        if moves.is_empty() {
            anyhow::bail!("scripted steps must contain at least one move");
        }
        if let Some(bad) = moves.iter().find(|m| **m != 1 && **m != -1) {
            anyhow::bail!("scripted steps must be -1 or +1, got {}", bad);
        }

        Ok(Self { moves, cursor: 0 })
    }

    /// Alternate `+1, -1, +1, -1, ...`
    pub fn alternating() -> Self {
        Self {
            moves: vec![1, -1],
            cursor: 0,
        }
    }

    /// Always move in one direction
    pub fn constant(direction: i64) -> Self {
        Self {
            moves: vec![if direction < 0 { -1 } else { 1 }],
            cursor: 0,
        }
    }
}

impl StepSource for ScriptedSteps {
    fn next_step(&mut self) -> i64 {
        let step = self.moves[self.cursor];
        self.cursor = (self.cursor + 1) % self.moves.len();
        step
    }
}
