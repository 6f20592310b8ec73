//! Per-frame driver
//!
//! One call to [`FrameLoop::frame`] corresponds to one display refresh:
//! queued input is applied, the simulation ticks (if running), and the
//! resulting snapshot goes to the render adapter. Input is never applied
//! inside a tick.

use tracing::trace;

use crate::interaction::{InputEvent, InteractionController};
use crate::render::RenderAdapter;
use crate::simulation::Simulation;

pub struct FrameLoop {
    sim: Simulation,
    controller: InteractionController,
}

impl FrameLoop {
    pub fn new(sim: Simulation) -> Self {
        let controller = InteractionController::new(sim.config());
        Self { sim, controller }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Queue input for the next frame
    pub fn push(&mut self, event: InputEvent) {
        self.controller.push(event);
    }

    /// Drain input, step, render. Returns whether a tick happened.
    pub fn frame<R: RenderAdapter + ?Sized>(&mut self, adapter: &mut R) -> bool {
        let applied = self.controller.drain(&mut self.sim);
        let ticked = self.sim.step();
        trace!(applied, ticked, alpha = self.sim.alpha(), "frame");
        adapter.render(&self.sim.snapshot());
        ticked
    }

    /// Start the simulation and render frames until it settles or
    /// `max_frames` frames were drawn; returns the frame count
    pub fn run<R: RenderAdapter + ?Sized>(&mut self, adapter: &mut R, max_frames: usize) -> usize {
        self.sim.start();
        let mut frames = 0;
        while frames < max_frames {
            frames += 1;
            if !self.frame(adapter) {
                break;
            }
        }
        frames
    }
}
