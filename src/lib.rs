//! forcelayout - A force-directed graph layout engine.
//!
//! The core is a headless, single-threaded simulation: nodes and links are
//! resolved once into index-based arenas, forces accumulate velocity changes
//! each tick, and a decaying alpha brings the layout to rest. Rendering,
//! pointer input and file formats sit at the edges and only talk to the core
//! through snapshots and an input queue.

pub mod config;
pub mod forces;
pub mod frame_loop;
pub mod generator;
pub mod interaction;
pub mod io;
pub mod model;
pub mod render;
pub mod server;
pub mod simulation;
pub mod view;

pub use config::{ConfigError, SimulationConfig};
pub use frame_loop::FrameLoop;
pub use interaction::{InputEvent, InteractionController};
pub use model::{GraphData, GraphLink, GraphNode};
pub use render::{Frame, RenderAdapter};
pub use simulation::{RunState, Simulation};
pub use view::{BoundingBox, ViewTransform};
