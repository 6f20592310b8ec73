//! Deterministic jitter for coincident nodes
//!
//! When two nodes share a position the separation vector has no direction.
//! Instead of a global random source, the nudge is derived from the seed and
//! the two node ids, so identical inputs always produce identical layouts.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Magnitude of the nudge (matches d3's jiggle)
const JITTER_SCALE: f64 = 1e-6;

/// 64-bit LCG step (Knuth MMIX constants)
fn lcg(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

/// Map the upper 53 bits to [-0.5, 0.5)
fn unit(state: u64) -> f64 {
    (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

/// Seeded jitter source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Jitter {
    seed: u64,
}

impl Jitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Nudge vector pointing from `other` toward `node`.
    ///
    /// Antisymmetric: `pair(a, b) == -pair(b, a)`, so both nodes of a
    /// coincident pair move apart.
    pub fn pair(&self, node: &str, other: &str) -> (f64, f64) {
        let (lo, hi, sign) = if node <= other {
            (node, other, 1.0)
        } else {
            (other, node, -1.0)
        };

        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        lo.hash(&mut hasher);
        hi.hash(&mut hasher);

        let s1 = lcg(hasher.finish());
        let s2 = lcg(s1);
        let mut dx = unit(s1);
        let dy = unit(s2);
        if dx == 0.0 && dy == 0.0 {
            dx = 0.5;
        }

        (sign * dx * JITTER_SCALE, sign * dy * JITTER_SCALE)
    }
}
