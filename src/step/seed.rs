//! Per-walker seed derivation
//!
//! Walkers launched at the same instant must not share a seed. A [`SeedPlan`]
//! holds one base seed for the whole run (wall clock by default) and derives each
//! walker's seed by mixing in the walker id with an odd multiplier. Multiplication
//! by an odd constant is a bijection on `u64`, and so is XOR with a fixed base, so
//! distinct ids always map to distinct seeds.

use std::time::{SystemTime, UNIX_EPOCH};

use super::coin::CoinFlip;

/// 2^64 / golden ratio, rounded to odd
const ID_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed derivation for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    base: u64,
}

impl SeedPlan {
    /// Base seed taken from the wall clock
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self { base: nanos }
    }

    /// Pinned base seed (reproducible runs)
    pub fn fixed(base: u64) -> Self {
        Self { base }
    }

    /// Use the pinned seed if given, otherwise the wall clock
    pub fn from_option(seed: Option<u64>) -> Self {
        seed.map(Self::fixed).unwrap_or_else(Self::from_clock)
    }

    /// Base seed of the run
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Seed for one walker
    #[inline]
    pub fn seed_for(&self, walker_id: u32) -> u64 {
        self.base ^ (walker_id as u64).wrapping_mul(ID_MIX)
    }

    /// Fair coin for one walker
    pub fn coin_for(&self, walker_id: u32) -> CoinFlip {
        CoinFlip::with_seed(self.seed_for(walker_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepSource;
    use std::collections::HashSet;

    #[test]
    fn test_seeds_never_collide() {
        let plan = SeedPlan::fixed(0xDEAD_BEEF);
        let seeds: HashSet<u64> = (0..10_000u32).map(|id| plan.seed_for(id)).collect();
        assert_eq!(seeds.len(), 10_000);
    }

    #[test]
    fn test_same_base_same_seed() {
        let a = SeedPlan::fixed(99);
        let b = SeedPlan::fixed(99);
        assert_eq!(a.seed_for(3), b.seed_for(3));
    }

    #[test]
    fn test_walkers_get_different_sequences() {
        let plan = SeedPlan::fixed(1_700_000_000);
        let mut one = plan.coin_for(1);
        let mut two = plan.coin_for(2);
        let seq_one: Vec<i64> = (0..128).map(|_| one.next_step()).collect();
        let seq_two: Vec<i64> = (0..128).map(|_| two.next_step()).collect();
        assert_ne!(seq_one, seq_two);

        // Independent fair coins agree on roughly half the draws
        let agree = seq_one.iter().zip(&seq_two).filter(|(a, b)| a == b).count();
        assert!(agree > 32 && agree < 96, "{} of 128 draws agree", agree);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SeedPlan::from_option(Some(5)), SeedPlan::fixed(5));
    }
}
