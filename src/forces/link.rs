//! Link (spring) force
//!
//! Pulls the endpoints of every link toward the link's rest distance. The
//! correction is split between the endpoints by `bias`, so the endpoint with
//! fewer connections moves more.

use super::{Force, ForceAccumulator, ForceContext};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkForce {
    iterations: usize,
}

impl LinkForce {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        let nodes = ctx.nodes;

        for _ in 0..self.iterations {
            for edge in ctx.edges {
                let (source, target) = (edge.source, edge.target);
                let (sx, sy) = acc.predicted(nodes, source);
                let (tx, ty) = acc.predicted(nodes, target);

                let mut dx = tx - sx;
                let mut dy = ty - sy;
                if dx == 0.0 && dy == 0.0 {
                    (dx, dy) = ctx.jitter.pair(&nodes[target].id, &nodes[source].id);
                }

                let l = (dx * dx + dy * dy).sqrt();
                // Hooke's law: F = k * (x - x0)
                let k = (l - edge.distance) / l * ctx.alpha * edge.strength;
                let (fx, fy) = (dx * k, dy * k);

                acc.add(target, -fx * edge.bias, -fy * edge.bias);
                acc.add(source, fx * (1.0 - edge.bias), fy * (1.0 - edge.bias));
            }
        }
    }
}
