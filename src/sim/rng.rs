/*
 * Deterministic Random Number Generator
 *
 * xorshift64* with a single 64-bit state. Output is stable across platforms,
 * so a seed fully reproduces a synthetic workload. Not suitable for
 * anything security related.
 */

/// Deterministic RNG for workload generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG
    ///
    /// A zero seed is remapped to a non-zero constant, zero being the one
    /// state xorshift never leaves.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Value in `[lo, hi)`; returns `lo` for an empty range
    pub fn range(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_u64() % (hi - lo)
    }

    /// True with probability `numerator / denominator`
    pub fn chance(&mut self, numerator: u64, denominator: u64) -> bool {
        denominator > 0 && self.next_u64() % denominator < numerator
    }
}
