//! CPU force simulation
//!
//! Owns the node/link arenas and advances them tick by tick. Alpha (the
//! simulation temperature) decays toward `alpha_target`; once it drops below
//! `alpha_min` the simulation settles and `step` stops ticking until it is
//! reheated or restarted.

use std::f64::consts::PI;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::forces::{ForceAccumulator, ForceContext, ForceSet, Jitter};
use crate::model::{GraphData, GraphLink, GraphNode};
use crate::render::{Frame, LinkFrame, NodeFrame};
use crate::view::BoundingBox;

/// Radius of the first ring of the initial spiral
const INITIAL_RADIUS: f64 = 10.0;

/// Whether the tick loop is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// A node with position and velocity for simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    /// Node ID (from GraphNode)
    pub id: String,
    /// Group tag for rendering
    pub group: u32,
    /// Human-readable label for display
    pub label: Option<String>,
    /// Collision and drawing radius
    pub radius: f64,
    /// Position in 2D space
    pub x: f64,
    pub y: f64,
    /// Velocity
    pub vx: f64,
    pub vy: f64,
    /// Forced position, overriding physics while set
    pub pin: Option<(f64, f64)>,
}

impl SimNode {
    pub fn new(id: impl Into<String>, group: u32, radius: f64, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            group,
            label: None,
            radius,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            pin: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// A link resolved to node indices, with its spring parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    /// Rest length
    pub distance: f64,
    pub strength: f64,
    /// Share of the correction applied to the target
    pub bias: f64,
}

/// Initial spiral placement (phyllotaxis)
fn spiral_position(index: usize, cx: f64, cy: f64) -> (f64, f64) {
    let angle = PI * (3.0 - 5.0_f64.sqrt()) * index as f64;
    let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn validate_node(node: &GraphNode) -> Result<(), ConfigError> {
    if node.radius.is_finite() && node.radius >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRadius {
            id: node.id.clone(),
            radius: node.radius,
        })
    }
}

fn validate_link(link: &GraphLink) -> Result<(), ConfigError> {
    if link.weight.is_finite() && link.weight > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight {
            from: link.source.clone(),
            to: link.target.clone(),
            weight: link.weight,
        })
    }
}

/// CPU force simulation
pub struct Simulation {
    config: SimulationConfig,
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    /// Input links whose endpoints all resolve
    links: Vec<GraphLink>,
    /// Mapping from node ID to index
    index: FxHashMap<String, usize>,
    forces: ForceSet,
    jitter: Jitter,
    accumulator: ForceAccumulator,
    alpha: f64,
    alpha_target: f64,
    state: RunState,
    ticks: u64,
}

impl Simulation {
    /// Create a simulation from graph data; starts idle
    pub fn new(graph: &GraphData, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        graph.nodes.iter().try_for_each(validate_node)?;
        graph.links.iter().try_for_each(validate_link)?;

        let mut sim = Self {
            forces: ForceSet::from_config(&config),
            jitter: Jitter::new(config.seed),
            alpha: config.alpha,
            alpha_target: config.alpha_target,
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            links: Vec::new(),
            index: FxHashMap::default(),
            accumulator: ForceAccumulator::default(),
            state: RunState::Idle,
            ticks: 0,
        };
        sim.replace_nodes(&graph.nodes);
        sim.resolve_links(graph.links.iter().cloned());

        debug!(
            nodes = sim.nodes.len(),
            links = sim.edges.len(),
            "simulation created"
        );
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Current position of a node
    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.node(id).map(|n| (n.x, n.y))
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Check if simulation is still running
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Number of ticks computed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Begin ticking from the current alpha
    pub fn start(&mut self) {
        if self.state == RunState::Idle {
            debug!(alpha = self.alpha, "simulation started");
            self.state = RunState::Running;
        }
    }

    /// Stop ticking; idempotent
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            debug!(alpha = self.alpha, ticks = self.ticks, "simulation stopped");
        }
        self.state = RunState::Idle;
    }

    /// Set the alpha target and resume ticking, even when settled
    pub fn reheat(&mut self, target: f64) {
        self.alpha_target = target.clamp(0.0, 1.0);
        debug!(alpha = self.alpha, target = self.alpha_target, "simulation reheated");
        self.state = RunState::Running;
    }

    /// Reset alpha to 1 and resume from the current positions
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        debug!("simulation restarted");
        self.state = RunState::Running;
    }

    /// Per-frame entry point: tick once if running.
    ///
    /// Returns whether a tick was computed.
    pub fn step(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        if self.nodes.is_empty() {
            self.settle_empty();
            return false;
        }
        self.tick();
        true
    }

    /// Run one simulation tick regardless of the run state
    pub fn tick(&mut self) {
        if self.nodes.is_empty() {
            self.settle_empty();
            return;
        }

        let n = self.nodes.len();
        self.accumulator.reset(n);
        let ctx = ForceContext {
            nodes: &self.nodes,
            edges: &self.edges,
            alpha: self.alpha,
            jitter: &self.jitter,
        };
        self.forces.apply(&ctx, &mut self.accumulator);

        let [mut sx, mut sy] = self.accumulator.shift();
        if !(sx.is_finite() && sy.is_finite()) {
            warn!("non-finite centering shift, ignoring");
            (sx, sy) = (0.0, 0.0);
        }

        let dt = self.config.time_step;
        let decay = self.config.velocity_decay;

        for (i, node) in self.nodes.iter_mut().enumerate() {
            if let Some((fx, fy)) = node.pin {
                node.x = fx;
                node.y = fy;
                node.vx = 0.0;
                node.vy = 0.0;
                continue;
            }

            let [dvx, dvy] = self.accumulator.delta(i);
            if !(dvx.is_finite() && dvy.is_finite()) {
                warn!(node = %node.id, "non-finite force, clamping to zero");
                self.accumulator.clear(i);
                node.vx = 0.0;
                node.vy = 0.0;
            }
            let [dvx, dvy] = self.accumulator.delta(i);

            node.vx = (node.vx + dvx * dt) * decay;
            node.vy = (node.vy + dvy * dt) * decay;

            let x = node.x + node.vx * dt + sx;
            let y = node.y + node.vy * dt + sy;
            if x.is_finite() && y.is_finite() {
                node.x = x;
                node.y = y;
            } else {
                warn!(node = %node.id, "non-finite position, holding previous");
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;

        if self.alpha < self.config.alpha_min && self.state == RunState::Running {
            self.settle();
        }
    }

    /// Tick until settled or `max_ticks` is reached; returns ticks computed
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        self.start();
        let mut count = 0;
        while count < max_ticks && self.step() {
            count += 1;
        }
        count
    }

    /// Nothing to lay out: cool down at once
    fn settle_empty(&mut self) {
        self.alpha = 0.0;
        self.settle();
    }

    fn settle(&mut self) {
        if self.state == RunState::Running {
            debug!(alpha = self.alpha, ticks = self.ticks, "simulation settled");
        }
        self.state = RunState::Idle;
    }

    // =========================================================================
    // Pins
    // =========================================================================

    /// Force a node to `(x, y)` on every tick until unpinned
    pub fn pin(&mut self, index: usize, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) if x.is_finite() && y.is_finite() => {
                node.pin = Some((x, y));
                true
            }
            _ => false,
        }
    }

    pub fn unpin(&mut self, index: usize) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => node.pin.take().is_some(),
            None => false,
        }
    }

    // =========================================================================
    // Node and link set changes
    // =========================================================================

    /// Replace the node and link sets, keeping the state of surviving ids.
    ///
    /// Does not restart the simulation; call `restart` for an incremental
    /// re-layout.
    pub fn set_graph(&mut self, graph: &GraphData) -> Result<(), ConfigError> {
        graph.nodes.iter().try_for_each(validate_node)?;
        graph.links.iter().try_for_each(validate_link)?;

        self.replace_nodes(&graph.nodes);
        self.resolve_links(graph.links.iter().cloned());
        debug!(
            nodes = self.nodes.len(),
            links = self.edges.len(),
            "graph replaced"
        );
        Ok(())
    }

    /// Add a node; returns false if the id already exists
    pub fn add_node(&mut self, node: GraphNode) -> Result<bool, ConfigError> {
        validate_node(&node)?;
        if self.index.contains_key(&node.id) {
            return Ok(false);
        }
        let sim_node = self.place(&node, self.nodes.len());
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(sim_node);
        self.rebuild_edges();
        Ok(true)
    }

    /// Remove a node and every link touching it
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(removed) = self.index_of(id) else {
            return false;
        };
        self.nodes.remove(removed);
        self.links.retain(|l| l.source != id && l.target != id);
        self.rebuild_index();
        self.rebuild_edges();
        true
    }

    /// Add a link; returns false (and drops it) if an endpoint is unknown
    pub fn add_link(&mut self, link: GraphLink) -> Result<bool, ConfigError> {
        validate_link(&link)?;
        let before = self.links.len();
        let mut links = self.links.clone();
        links.push(link);
        self.resolve_links(links.into_iter());
        Ok(self.links.len() > before)
    }

    fn place(&self, node: &GraphNode, index: usize) -> SimNode {
        let (cx, cy) = self.config.center_point();
        let (sx, sy) = spiral_position(index, cx, cy);
        let mut sim_node = SimNode::new(
            node.id.clone(),
            node.group,
            node.radius,
            node.x.unwrap_or(sx),
            node.y.unwrap_or(sy),
        );
        sim_node.label = node.label.clone();
        sim_node
    }

    fn replace_nodes(&mut self, input: &[GraphNode]) {
        let mut previous: FxHashMap<String, SimNode> = self
            .nodes
            .drain(..)
            .map(|n| (n.id.clone(), n))
            .collect();

        let mut seen = FxHashSet::default();
        let mut nodes = Vec::with_capacity(input.len());
        for node in input {
            if !seen.insert(node.id.as_str()) {
                warn!(node = %node.id, "dropping duplicate node id");
                continue;
            }
            let sim_node = match previous.remove(&node.id) {
                Some(mut existing) => {
                    existing.group = node.group;
                    existing.radius = node.radius;
                    existing.label = node.label.clone();
                    existing
                }
                None => self.place(node, nodes.len()),
            };
            nodes.push(sim_node);
        }

        self.nodes = nodes;
        self.rebuild_index();
    }

    fn resolve_links(&mut self, links: impl Iterator<Item = GraphLink>) {
        self.links = links
            .filter(|link| {
                let known =
                    self.index.contains_key(&link.source) && self.index.contains_key(&link.target);
                if !known {
                    warn!(
                        source = %link.source,
                        target = %link.target,
                        "dropping link with unknown endpoint"
                    );
                }
                known
            })
            .collect();
        self.rebuild_edges();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    fn rebuild_edges(&mut self) {
        let link_config = self.config.link.clone().unwrap_or_default();

        let mut degree = vec![0usize; self.nodes.len()];
        let resolved: Vec<(usize, usize, f64)> = self
            .links
            .iter()
            .filter_map(|l| Some((self.index_of(&l.source)?, self.index_of(&l.target)?, l.weight)))
            .collect();
        for &(s, t, _) in &resolved {
            degree[s] += 1;
            degree[t] += 1;
        }

        self.edges = resolved
            .into_iter()
            .map(|(source, target, weight)| {
                let (ds, dt) = (degree[source] as f64, degree[target] as f64);
                let distance = if link_config.weight_scaled_distance {
                    link_config.distance / weight
                } else {
                    link_config.distance
                };
                SimEdge {
                    source,
                    target,
                    weight,
                    distance,
                    strength: link_config.strength.unwrap_or(1.0 / ds.min(dt)),
                    bias: ds / (ds + dt),
                }
            })
            .collect();
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Read-only copy of positions for rendering
    pub fn snapshot(&self) -> Frame {
        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeFrame {
                id: n.id.clone(),
                label: n.label.clone(),
                group: n.group,
                radius: n.radius,
                x: n.x,
                y: n.y,
                pinned: n.is_pinned(),
            })
            .collect();

        let links = self
            .edges
            .iter()
            .map(|e| {
                let (s, t) = (&self.nodes[e.source], &self.nodes[e.target]);
                LinkFrame {
                    source: s.id.clone(),
                    target: t.id.clone(),
                    weight: e.weight,
                    x1: s.x,
                    y1: s.y,
                    x2: t.x,
                    y2: t.y,
                }
            })
            .collect();

        Frame {
            tick: self.ticks,
            alpha: self.alpha,
            nodes,
            links,
        }
    }

    /// Bounding box of all node extents
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for node in &self.nodes {
            bounds.include_circle(node.x, node.y, node.radius);
        }
        bounds
    }
}
