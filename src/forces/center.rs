//! Centering force
//!
//! Translates the whole layout so its centroid moves toward the target point.
//! Relative positions are untouched, so this alone never bounds a layout.

use super::{Force, ForceAccumulator, ForceContext};

#[derive(Debug, Clone, PartialEq)]
pub struct CenterForce {
    x: f64,
    y: f64,
    strength: f64,
}

impl CenterForce {
    pub fn new(x: f64, y: f64, strength: f64) -> Self {
        Self { x, y, strength }
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        let n = ctx.nodes.len();
        if n == 0 {
            return;
        }

        let (sx, sy) = ctx
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let (mx, my) = (sx / n as f64, sy / n as f64);

        acc.translate((self.x - mx) * self.strength, (self.y - my) * self.strength);
    }
}
