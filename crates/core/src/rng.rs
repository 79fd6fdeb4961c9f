//! RNG module - seeded template selection
//!
//! A small LCG keeps sessions reproducible: the same seed and the same inputs
//! produce the same sequence of spawned pieces.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    ///
    /// Uses the high bits; the low bits of an LCG have short periods.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let hi = (self.next_u32() >> 16) as usize;
        hi % len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        let seq1: Vec<u32> = (0..10).map(|_| rng1.next_u32()).collect();
        let seq2: Vec<u32> = (0..10).map(|_| rng2.next_u32()).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn next_index_covers_every_slot() {
        let mut rng = SimpleRng::new(42);
        let mut seen = [0u32; 7];
        for _ in 0..7000 {
            seen[rng.next_index(7)] += 1;
        }
        // Roughly uniform: each of 7 slots near 1000.
        for count in seen {
            assert!((700..1300).contains(&count), "count {count}");
        }
    }
}
