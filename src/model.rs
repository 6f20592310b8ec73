//! Input graph types
//!
//! These are the shapes supplied by the surrounding UI layer (or read from
//! JSON/YAML files). The simulation resolves them once into its own arena.

use serde::{Deserialize, Serialize};

/// Default node radius when the input does not specify one
pub const DEFAULT_NODE_RADIUS: f64 = 5.0;

/// Default link weight
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

fn default_radius() -> f64 {
    DEFAULT_NODE_RADIUS
}

fn default_weight() -> f64 {
    DEFAULT_LINK_WEIGHT
}

/// A node in the input graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Stable, unique identifier
    pub id: String,

    /// Group/category tag (rendering only, no effect on physics)
    #[serde(default)]
    pub group: u32,

    /// Radius used by the collision force and for drawing
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Optional display label (falls back to the id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Optional initial x position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Optional initial y position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl GraphNode {
    /// Create a node with default group and radius
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: 0,
            radius: DEFAULT_NODE_RADIUS,
            label: None,
            x: None,
            y: None,
        }
    }

    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Start the node at a fixed initial position instead of the spiral
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// A link between two nodes, referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Weight; heavier links may pull tighter when weight scaling is enabled
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: DEFAULT_LINK_WEIGHT,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Complete input graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    /// All nodes in the graph
    #[serde(default)]
    pub nodes: Vec<GraphNode>,

    /// All links in the graph
    #[serde(default, alias = "edges")]
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
        Self { nodes, links }
    }

    /// The hub-and-chain demo graph shown when no input is supplied
    pub fn sample() -> Self {
        let nodes = vec![
            GraphNode::new("Central Hub").with_group(1).with_radius(20.0),
            GraphNode::new("Node A").with_group(2).with_radius(15.0),
            GraphNode::new("Node B").with_group(2).with_radius(15.0),
            GraphNode::new("Node C").with_group(3).with_radius(12.0),
            GraphNode::new("Node D").with_group(3).with_radius(12.0),
            GraphNode::new("Node E").with_group(4).with_radius(10.0),
            GraphNode::new("Node F").with_group(4).with_radius(10.0),
            GraphNode::new("Node G").with_group(5).with_radius(8.0),
            GraphNode::new("Node H").with_group(5).with_radius(8.0),
        ];
        let links = [
            ("Central Hub", "Node A", 5.0),
            ("Central Hub", "Node B", 4.0),
            ("Node A", "Node C", 3.0),
            ("Node B", "Node D", 3.0),
            ("Node C", "Node E", 2.0),
            ("Node D", "Node F", 2.0),
            ("Node E", "Node G", 1.0),
            ("Node F", "Node H", 1.0),
            ("Node A", "Node B", 2.0),
            ("Node C", "Node D", 1.0),
        ]
        .into_iter()
        .map(|(s, t, w)| GraphLink::new(s, t).with_weight(w))
        .collect();

        Self { nodes, links }
    }
}
