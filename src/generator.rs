//! Headless layout generation
//!
//! Runs a simulation to rest and writes the final frame in the format picked
//! by the output path. Used by the `layout` command and the preview server.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::io::{FormatRegistry, IoResult};
use crate::model::GraphData;
use crate::render::Frame;
use crate::simulation::Simulation;

/// Default cap on ticks for a headless layout
pub const DEFAULT_MAX_TICKS: usize = 1000;

/// Settings for a headless layout run
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub config: SimulationConfig,
    pub max_ticks: usize,
    /// Page title; defaults to the input file stem
    pub title: Option<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            max_ticks: DEFAULT_MAX_TICKS,
            title: None,
        }
    }
}

/// A finished layout, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    pub title: String,
    pub width: f64,
    pub height: f64,
    /// Zoom extent for interactive viewers
    pub min_scale: f64,
    pub max_scale: f64,
    pub frame: Frame,
}

/// Run the simulation until it settles or hits `max_ticks`
pub fn compute_layout(
    graph: &GraphData,
    options: &LayoutOptions,
) -> Result<LayoutDocument, ConfigError> {
    let mut sim = Simulation::new(graph, options.config.clone())?;
    let ticks = sim.run_until_settled(options.max_ticks);

    if sim.is_running() {
        warn!(
            ticks,
            alpha = sim.alpha(),
            "layout stopped at tick cap before settling"
        );
    } else {
        debug!(ticks, "layout settled");
    }

    Ok(LayoutDocument {
        title: options.title.clone().unwrap_or_else(|| "Graph layout".to_string()),
        width: options.config.width,
        height: options.config.height,
        min_scale: options.config.interaction.min_scale,
        max_scale: options.config.interaction.max_scale,
        frame: sim.snapshot(),
    })
}

/// Read `input`, lay it out, and write `output`
pub fn generate(
    input: &Path,
    output: &Path,
    options: &LayoutOptions,
) -> IoResult<LayoutDocument> {
    let registry = FormatRegistry::with_defaults();
    let reader = registry.reader_for_path(input)?;
    let writer = registry.writer_for_path(output)?;

    let graph = reader.read(input)?;
    let mut options = options.clone();
    if options.title.is_none() {
        options.title = input
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
    }

    let layout = compute_layout(&graph, &options)?;
    writer.write(&layout, output)?;
    info!(
        nodes = layout.frame.nodes.len(),
        links = layout.frame.links.len(),
        ticks = layout.frame.tick,
        output = %output.display(),
        "layout written"
    );
    Ok(layout)
}
