//! Pointer interaction
//!
//! Input events arrive in screen coordinates and are queued; the frame loop
//! drains the queue between ticks so a tick never observes a half-applied
//! drag. Dragging pins the grabbed node to the pointer and keeps the
//! simulation warm; zoom and pan only change the view transform.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{InteractionConfig, SimulationConfig};
use crate::simulation::Simulation;
use crate::view::ViewTransform;

/// A pointer or wheel event in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    /// Multiply the zoom level by `factor` around the anchor `(x, y)`
    Zoom { factor: f64, x: f64, y: f64 },
    Pan { dx: f64, dy: f64 },
}

/// Applies queued input to the simulation and view
#[derive(Debug, Clone)]
pub struct InteractionController {
    view: ViewTransform,
    queue: VecDeque<InputEvent>,
    /// Id of the node being dragged
    drag: Option<String>,
    config: InteractionConfig,
}

impl InteractionController {
    pub fn new(config: &SimulationConfig) -> Self {
        let interaction = config.interaction.clone();
        Self {
            view: ViewTransform::new(config.width, config.height)
                .with_scale_extent(interaction.min_scale, interaction.max_scale),
            queue: VecDeque::new(),
            drag: None,
            config: interaction,
        }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Id of the node currently being dragged
    pub fn dragged(&self) -> Option<&str> {
        self.drag.as_deref()
    }

    /// Queue an event for the next drain
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Apply every queued event in order; returns how many were applied
    pub fn drain(&mut self, sim: &mut Simulation) -> usize {
        let mut applied = 0;
        while let Some(event) = self.queue.pop_front() {
            self.apply(event, sim);
            applied += 1;
        }
        applied
    }

    /// Topmost node under a screen point.
    ///
    /// Nodes later in draw order are on top. A node is hit within its radius
    /// or `hit_radius`, whichever is larger.
    pub fn node_at(&self, sim: &Simulation, sx: f64, sy: f64) -> Option<usize> {
        let (wx, wy) = self.view.screen_to_world(sx, sy);
        sim.nodes().iter().enumerate().rev().find_map(|(i, node)| {
            let reach = node.radius.max(self.config.hit_radius);
            let (dx, dy) = (node.x - wx, node.y - wy);
            (dx * dx + dy * dy <= reach * reach).then_some(i)
        })
    }

    fn apply(&mut self, event: InputEvent, sim: &mut Simulation) {
        match event {
            InputEvent::DragStart { x, y } => {
                self.release(sim);
                if let Some(index) = self.node_at(sim, x, y) {
                    let node = &sim.nodes()[index];
                    let (id, nx, ny) = (node.id.clone(), node.x, node.y);
                    debug!(node = %id, "drag started");
                    sim.pin(index, nx, ny);
                    sim.reheat(self.config.drag_alpha_target);
                    self.drag = Some(id);
                }
            }
            InputEvent::DragMove { x, y } => {
                let Some(id) = &self.drag else {
                    return;
                };
                match sim.index_of(id) {
                    Some(index) => {
                        let (wx, wy) = self.view.screen_to_world(x, y);
                        sim.pin(index, wx, wy);
                    }
                    // node was removed mid-drag
                    None => self.drag = None,
                }
            }
            InputEvent::DragEnd => {
                if self.release(sim) {
                    sim.reheat(0.0);
                }
            }
            InputEvent::Zoom { factor, x, y } => self.view.zoom_at(factor, x, y),
            InputEvent::Pan { dx, dy } => self.view.pan(dx, dy),
        }
    }

    /// Unpin the dragged node, if any
    fn release(&mut self, sim: &mut Simulation) -> bool {
        let Some(id) = self.drag.take() else {
            return false;
        };
        debug!(node = %id, "drag ended");
        if let Some(index) = sim.index_of(&id) {
            sim.unpin(index);
        }
        true
    }
}
