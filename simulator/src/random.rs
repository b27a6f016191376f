use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A deterministic random number stream, identified by a seed and a run
/// number. The same (seed, run) pair always produces the same draws;
/// bumping the run number gives an independent replication of the same
/// experiment.
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64, run: u64) -> Self {
        let mut key = [0u8; 32];
        key[0..8].copy_from_slice(&seed.to_le_bytes());
        key[8..16].copy_from_slice(&run.to_le_bytes());
        // Spread the entropy over the whole key so nearby (seed, run)
        // pairs do not share a prefix-zero state.
        key[16..24].copy_from_slice(&seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).to_le_bytes());
        key[24..32].copy_from_slice(&run.wrapping_mul(0xc2b2_ae3d_27d4_eb4f).to_le_bytes());
        RandomStream {
            rng: StdRng::from_seed(key),
        }
    }

    /// A uniform draw from the inclusive range [min, max]. Degenerate
    /// ranges (max <= min) return min without consuming randomness.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        Uniform::new_inclusive(min, max).sample(&mut self.rng)
    }

    /// Splits off an independent child stream. Forking advances this
    /// stream, so repeated forks yield distinct children.
    pub fn fork(&mut self) -> RandomStream {
        let seed = self.rng.gen();
        let run = self.rng.gen();
        RandomStream::new(seed, run)
    }
}
