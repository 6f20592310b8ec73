//! Collision avoidance
//!
//! Pairs whose predicted extents overlap are pushed apart along their
//! separation vector, weighted by squared radii so small nodes yield to large
//! ones. A fixed number of passes runs per tick; overlap is reduced, not
//! solved exactly. Not scaled by alpha.

use super::{Force, ForceAccumulator, ForceContext};
use crate::config::CollideConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct CollideForce {
    strength: f64,
    padding: f64,
    iterations: usize,
}

impl CollideForce {
    pub fn from_config(config: &CollideConfig) -> Self {
        Self {
            strength: config.strength,
            padding: config.padding,
            iterations: config.iterations.max(1),
        }
    }
}

impl Force for CollideForce {
    fn name(&self) -> &'static str {
        "collide"
    }

    fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        let nodes = ctx.nodes;

        for _ in 0..self.iterations {
            for i in 0..nodes.len() {
                let ri = nodes[i].radius + self.padding;
                let ri2 = ri * ri;
                let (xi, yi) = acc.predicted(nodes, i);

                for j in (i + 1)..nodes.len() {
                    let rj = nodes[j].radius + self.padding;
                    let r = ri + rj;
                    let (xj, yj) = acc.predicted(nodes, j);

                    let mut dx = xi - xj;
                    let mut dy = yi - yj;
                    let mut l = dx * dx + dy * dy;
                    if l >= r * r {
                        continue;
                    }
                    if l == 0.0 {
                        (dx, dy) = ctx.jitter.pair(&nodes[i].id, &nodes[j].id);
                        l = dx * dx + dy * dy;
                    }

                    let l = l.sqrt();
                    let k = (r - l) / l * self.strength;
                    let (px, py) = (dx * k, dy * k);
                    let rj2 = rj * rj;
                    let w = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };

                    acc.add(i, px * w, py * w);
                    acc.add(j, -px * (1.0 - w), -py * (1.0 - w));
                }
            }
        }
    }
}
