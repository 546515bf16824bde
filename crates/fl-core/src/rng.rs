//! The run's single deterministic random number generator.
//!
//! One `SimRng` is created from the configured seed and threaded through the
//! world by `&mut`.  It drives robot placement, initial inventory, random
//! request insertion, content generation, and evasion jitter.  Because the
//! simulation is single-threaded and every component is advanced in a fixed
//! order, the draw sequence (and therefore the whole run) is reproducible
//! from the seed alone.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-wide RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Position at which to insert into a queue of length `len`: uniform in
    /// `[0, len)`, or `0` for an empty queue.  A fresh entry therefore never
    /// lands behind every existing one.
    #[inline]
    pub fn insert_index(&mut self, len: usize) -> usize {
        if len == 0 { 0 } else { self.0.gen_range(0..len) }
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Draw an index according to non-negative `weights`.  Falls back to a
    /// uniform draw when every weight is zero; `None` for an empty slice.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return Some(self.0.gen_range(0..weights.len()));
        }
        let mut pick = self.0.r#gen::<f32>() * total;
        for (i, w) in weights.iter().enumerate() {
            let w = w.max(0.0);
            if pick < w {
                return Some(i);
            }
            pick -= w;
        }
        Some(weights.len() - 1)
    }
}
