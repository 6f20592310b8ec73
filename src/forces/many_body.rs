//! Many-body (charge) force
//!
//! Every node pair within `distance_max` exchanges a force inversely
//! proportional to the squared distance. Negative strength repels. With
//! `theta > 0` distant groups of nodes are approximated by their centroid
//! using a Barnes-Hut quadtree.

use super::quadtree::QuadTree;
use super::{Force, ForceAccumulator, ForceContext};
use crate::config::ManyBodyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ManyBodyForce {
    strength: f64,
    distance_min2: f64,
    distance_max2: f64,
    theta2: f64,
}

impl ManyBodyForce {
    pub fn from_config(config: &ManyBodyConfig) -> Self {
        Self {
            strength: config.strength,
            distance_min2: config.distance_min * config.distance_min,
            distance_max2: config.distance_max * config.distance_max,
            theta2: config.theta * config.theta,
        }
    }

    /// Clamp tiny squared distances so the force stays bounded
    fn soften(&self, l: f64) -> f64 {
        if l < self.distance_min2 {
            (self.distance_min2 * l).sqrt()
        } else {
            l
        }
    }

    /// Reference implementation: sum over every unordered pair
    fn apply_exact(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        let nodes = ctx.nodes;
        let scale = self.strength * ctx.alpha;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let mut dx = nodes[j].x - nodes[i].x;
                let mut dy = nodes[j].y - nodes[i].y;
                let mut l = dx * dx + dy * dy;
                if l >= self.distance_max2 {
                    continue;
                }
                if l == 0.0 {
                    (dx, dy) = ctx.jitter.pair(&nodes[j].id, &nodes[i].id);
                    l = dx * dx + dy * dy;
                }
                let k = scale / self.soften(l);
                acc.add(i, dx * k, dy * k);
                acc.add(j, -dx * k, -dy * k);
            }
        }
    }

    /// Barnes-Hut approximation over a quadtree of current positions
    fn apply_approximate(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        let nodes = ctx.nodes;
        let positions: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
        let tree = QuadTree::build(&positions);
        let scale = self.strength * ctx.alpha;

        for (i, node) in nodes.iter().enumerate() {
            let (mut fx, mut fy) = (0.0, 0.0);

            tree.visit(|cell| {
                if !cell.is_leaf() {
                    let (cx, cy) = cell.centroid();
                    let (dx, dy) = (cx - node.x, cy - node.y);
                    let l = dx * dx + dy * dy;
                    // never let a node's own cell stand in for it
                    let inside = node.x >= cell.x0
                        && node.x <= cell.x0 + cell.size
                        && node.y >= cell.y0
                        && node.y <= cell.y0 + cell.size;
                    if !inside && cell.size * cell.size / self.theta2 < l {
                        if l < self.distance_max2 {
                            let k = scale * cell.count() as f64 / self.soften(l);
                            fx += dx * k;
                            fy += dy * k;
                        }
                        return true;
                    }
                    return false;
                }

                for &j in cell.points() {
                    if j == i {
                        continue;
                    }
                    let mut dx = nodes[j].x - node.x;
                    let mut dy = nodes[j].y - node.y;
                    let mut l = dx * dx + dy * dy;
                    if l >= self.distance_max2 {
                        continue;
                    }
                    if l == 0.0 {
                        (dx, dy) = ctx.jitter.pair(&nodes[j].id, &node.id);
                        l = dx * dx + dy * dy;
                    }
                    let k = scale / self.soften(l);
                    fx += dx * k;
                    fy += dy * k;
                }
                true
            });

            acc.add(i, fx, fy);
        }
    }
}

impl Force for ManyBodyForce {
    fn name(&self) -> &'static str {
        "many_body"
    }

    fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        if self.theta2 == 0.0 {
            self.apply_exact(ctx, acc);
        } else {
            self.apply_approximate(ctx, acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::Jitter;
    use crate::forces::test_util::node;
    use crate::simulation::SimNode;

    fn run(force: &ManyBodyForce, nodes: &[SimNode]) -> ForceAccumulator {
        let jitter = Jitter::new(0);
        let ctx = ForceContext {
            nodes,
            edges: &[],
            alpha: 1.0,
            jitter: &jitter,
        };
        let mut acc = ForceAccumulator::default();
        acc.reset(nodes.len());
        force.apply(&ctx, &mut acc);
        acc
    }

    fn exact() -> ManyBodyForce {
        ManyBodyForce::from_config(&ManyBodyConfig {
            theta: 0.0,
            ..Default::default()
        })
    }

    fn cloud() -> Vec<SimNode> {
        (0..40)
            .map(|i| {
                let t = i as f64;
                node(
                    &format!("n{i}"),
                    (t * 37.0) % 200.0,
                    (t * 53.0 + 11.0) % 180.0,
                    5.0,
                )
            })
            .collect()
    }

    #[test]
    fn two_nodes_repel_symmetrically() {
        let nodes = vec![node("a", 0.0, 0.0, 5.0), node("b", 10.0, 0.0, 5.0)];
        let acc = run(&exact(), &nodes);

        // strength -30, distance 10: |f| = 10 * 30 / 100 = 3
        assert_eq!(acc.delta(0), [-3.0, 0.0]);
        assert_eq!(acc.delta(1), [3.0, 0.0]);
    }

    #[test]
    fn pairs_beyond_distance_max_are_ignored() {
        let nodes = vec![node("a", 0.0, 0.0, 5.0), node("b", 500.0, 0.0, 5.0)];
        let acc = run(&exact(), &nodes);
        assert_eq!(acc.delta(0), [0.0, 0.0]);
        assert_eq!(acc.delta(1), [0.0, 0.0]);
    }

    #[test]
    fn coincident_nodes_get_finite_opposite_forces() {
        let nodes = vec![node("a", 3.0, 3.0, 5.0), node("b", 3.0, 3.0, 5.0)];
        let acc = run(&exact(), &nodes);
        let [ax, ay] = acc.delta(0);
        let [bx, by] = acc.delta(1);

        assert!(ax.is_finite() && ay.is_finite());
        assert!(ax != 0.0 || ay != 0.0);
        assert_eq!((ax, ay), (-bx, -by));
    }

    #[test]
    fn tiny_theta_matches_exact_sum() {
        let nodes = cloud();
        let reference = run(&exact(), &nodes);
        let tree = run(
            &ManyBodyForce::from_config(&ManyBodyConfig {
                theta: 1e-6,
                ..Default::default()
            }),
            &nodes,
        );

        for i in 0..nodes.len() {
            let [ex, ey] = reference.delta(i);
            let [tx, ty] = tree.delta(i);
            assert!((ex - tx).abs() < 1e-9, "node {i}: {ex} vs {tx}");
            assert!((ey - ty).abs() < 1e-9, "node {i}: {ey} vs {ty}");
        }
    }

    #[test]
    fn barnes_hut_stays_close_to_exact() {
        let nodes = cloud();
        let reference = run(&exact(), &nodes);
        let approx = run(&ManyBodyForce::from_config(&ManyBodyConfig::default()), &nodes);

        let mut error = 0.0;
        let mut magnitude = 0.0;
        for i in 0..nodes.len() {
            let [ex, ey] = reference.delta(i);
            let [ax, ay] = approx.delta(i);
            error += ((ex - ax).powi(2) + (ey - ay).powi(2)).sqrt();
            magnitude += (ex * ex + ey * ey).sqrt();
        }
        assert!(
            error < 0.2 * magnitude,
            "relative error {} too large",
            error / magnitude
        );
    }
}
