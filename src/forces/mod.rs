//! Spatial force model
//!
//! Each force reads the current node state and accumulates velocity deltas.
//! Forces run in a fixed order (link, many-body, center, collide) and a later
//! force sees the deltas accumulated by earlier ones, so "predicted" positions
//! (`position + velocity`) stay consistent within a tick.
//!
//! # Forces
//!
//! - **Link Force**: Spring forces between connected nodes
//! - **Many-Body Force**: Repulsion between node pairs (exact or Barnes-Hut)
//! - **Center Force**: Uniform translation of the centroid toward a target
//! - **Collide Force**: Separation of overlapping node extents

mod center;
mod collide;
mod jitter;
mod link;
mod many_body;
pub mod quadtree;

pub use center::CenterForce;
pub use collide::CollideForce;
pub use jitter::Jitter;
pub use link::LinkForce;
pub use many_body::ManyBodyForce;

use tracing::trace;

use crate::config::SimulationConfig;
use crate::simulation::{SimEdge, SimNode};

/// Everything a force may read during one tick
pub struct ForceContext<'a> {
    pub nodes: &'a [SimNode],
    pub edges: &'a [SimEdge],
    /// Current simulation temperature
    pub alpha: f64,
    pub jitter: &'a Jitter,
}

/// Per-node velocity deltas plus a uniform position shift
#[derive(Debug, Clone, Default)]
pub struct ForceAccumulator {
    delta: Vec<[f64; 2]>,
    shift: [f64; 2],
}

impl ForceAccumulator {
    /// Clear and resize for `len` nodes
    pub fn reset(&mut self, len: usize) {
        self.delta.clear();
        self.delta.resize(len, [0.0, 0.0]);
        self.shift = [0.0, 0.0];
    }

    pub fn add(&mut self, index: usize, dx: f64, dy: f64) {
        let d = &mut self.delta[index];
        d[0] += dx;
        d[1] += dy;
    }

    /// Accumulated velocity delta of a node
    pub fn delta(&self, index: usize) -> [f64; 2] {
        self.delta[index]
    }

    /// Drop the delta of a node
    pub fn clear(&mut self, index: usize) {
        self.delta[index] = [0.0, 0.0];
    }

    /// Uniform translation applied to every unpinned node
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.shift[0] += dx;
        self.shift[1] += dy;
    }

    pub fn shift(&self) -> [f64; 2] {
        self.shift
    }

    /// Velocity including deltas accumulated so far this tick
    pub fn velocity(&self, nodes: &[SimNode], index: usize) -> (f64, f64) {
        let d = self.delta[index];
        (nodes[index].vx + d[0], nodes[index].vy + d[1])
    }

    /// Position the node would reach if the tick ended now
    pub fn predicted(&self, nodes: &[SimNode], index: usize) -> (f64, f64) {
        let (vx, vy) = self.velocity(nodes, index);
        (nodes[index].x + vx, nodes[index].y + vy)
    }
}

/// A composable force
pub trait Force {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Accumulate this force's contribution for the current tick
    fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator);
}

/// The active forces, in application order
#[derive(Debug, Clone, Default)]
pub struct ForceSet {
    pub link: Option<LinkForce>,
    pub many_body: Option<ManyBodyForce>,
    pub center: Option<CenterForce>,
    pub collide: Option<CollideForce>,
}

impl ForceSet {
    /// Build the force set described by a configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        let (cx, cy) = config.center_point();
        Self {
            link: config.link.as_ref().map(|c| LinkForce::new(c.iterations)),
            many_body: config.many_body.as_ref().map(ManyBodyForce::from_config),
            center: config
                .center
                .as_ref()
                .map(|c| CenterForce::new(cx, cy, c.strength)),
            collide: config.collide.as_ref().map(CollideForce::from_config),
        }
    }

    /// Iterate the enabled forces in application order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Force> {
        let link = self.link.as_ref().map(|f| f as &dyn Force);
        let many_body = self.many_body.as_ref().map(|f| f as &dyn Force);
        let center = self.center.as_ref().map(|f| f as &dyn Force);
        let collide = self.collide.as_ref().map(|f| f as &dyn Force);
        [link, many_body, center, collide].into_iter().flatten()
    }

    /// Run every enabled force
    pub fn apply(&self, ctx: &ForceContext<'_>, acc: &mut ForceAccumulator) {
        for force in self.iter() {
            trace!(force = force.name(), alpha = ctx.alpha, "applying force");
            force.apply(ctx, acc);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::simulation::SimNode;

    /// Node at a position with zero velocity
    pub fn node(id: &str, x: f64, y: f64, radius: f64) -> SimNode {
        SimNode::new(id, 0, radius, x, y)
    }
}
