//! Step sources for random walks
//!
//! A step source produces the sequence of unit moves a walker applies to its
//! position. Every draw is either `-1` or `+1`.
//!
//! # Sources
//!
//! - **CoinFlip**: fair coin backed by xoshiro256++ (the default)
//! - **ScriptedSteps**: replays a fixed sequence of moves, for tests and replays
//!
//! Seeds for coin flips come from a [`seed::SeedPlan`], which guarantees that no two
//! walker ids in a run share a seed.
//!
//! # Example
//!
//! ```
//! use randwalk::step::{StepSource, coin::CoinFlip};
//!
//! let mut source = CoinFlip::with_seed(7);
//! for _ in 0..10 {
//!     let step = source.next_step();
//!     assert!(step == -1 || step == 1);
//! }
//! ```

/// Source of unit steps for a single walker
///
/// Each walker owns its source exclusively, so implementations only need `Send`
/// to be moved into the walker's thread.
pub trait StepSource: Send {
    /// Draw the next move: `-1` or `+1`
    fn next_step(&mut self) -> i64;
}

impl<S: StepSource + ?Sized> StepSource for Box<S> {
    fn next_step(&mut self) -> i64 {
        (**self).next_step()
    }
}

pub mod coin;
pub mod scripted;
pub mod seed;
