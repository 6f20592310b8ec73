//! Reader/Writer traits and format dispatch
//!
//! Readers load input graphs (JSON, YAML); writers emit a computed layout
//! (SVG, HTML viewer page, JSON frame). The registry picks one by file
//! extension.

use std::fs;
use std::path::Path;

use askama::Template;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};
use crate::generator::LayoutDocument;
use crate::model::GraphData;
use crate::render::{group_color, render_svg};

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),

    /// The configuration or graph was rejected
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader parses an input file into graph data
pub trait Reader {
    fn read(&self, input: &Path) -> IoResult<GraphData>;

    /// File extensions this reader can handle (e.g., ["yaml", "yml"])
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A writer outputs a computed layout to a specific format
pub trait Writer {
    fn write(&self, layout: &LayoutDocument, output: &Path) -> IoResult<()>;

    /// Identifier for this output format; also its file extension
    fn format_id(&self) -> &str;
}

fn parse_json<T: DeserializeOwned>(content: &str) -> IoResult<T> {
    serde_json::from_str(content).map_err(|e| IoError::Parse(e.to_string()))
}

fn parse_yaml<T: DeserializeOwned>(content: &str) -> IoResult<T> {
    serde_yaml::from_str(content).map_err(|e| IoError::Parse(e.to_string()))
}

fn write_file(output: &Path, contents: &str) -> IoResult<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, contents)?;
    Ok(())
}

/// Reader for JSON graphs (`{"nodes": [...], "links": [...]}`)
#[derive(Debug, Default)]
pub struct JsonReader;

impl Reader for JsonReader {
    fn read(&self, input: &Path) -> IoResult<GraphData> {
        parse_json(&fs::read_to_string(input)?)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Reader for YAML graphs
#[derive(Debug, Default)]
pub struct YamlReader;

impl Reader for YamlReader {
    fn read(&self, input: &Path) -> IoResult<GraphData> {
        parse_yaml(&fs::read_to_string(input)?)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Writes the final frame as a standalone SVG
#[derive(Debug, Default)]
pub struct SvgWriter;

impl Writer for SvgWriter {
    fn write(&self, layout: &LayoutDocument, output: &Path) -> IoResult<()> {
        write_file(output, &render_svg(&layout.frame, layout.width, layout.height))
    }

    fn format_id(&self) -> &str {
        "svg"
    }
}

/// Writes the final frame as pretty-printed JSON
#[derive(Debug, Default)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    fn write(&self, layout: &LayoutDocument, output: &Path) -> IoResult<()> {
        let json = serde_json::to_string_pretty(&layout.frame)
            .map_err(|e| IoError::Write(e.to_string()))?;
        write_file(output, &json)
    }

    fn format_id(&self) -> &str {
        "json"
    }
}

/// Legend entry on the viewer page
struct GroupEntry {
    group: u32,
    color: &'static str,
    count: usize,
}

#[derive(Template)]
#[template(path = "viewer.html")]
struct ViewerTemplate<'a> {
    title: &'a str,
    node_count: usize,
    link_count: usize,
    ticks: u64,
    alpha: String,
    groups: &'a [GroupEntry],
    min_scale: f64,
    max_scale: f64,
    svg: &'a str,
    /// Frame JSON, safe to embed in a script element
    frame_json: &'a str,
}

/// Writes an HTML page with the layout and a pan/zoom viewer
#[derive(Debug, Default)]
pub struct HtmlWriter;

impl HtmlWriter {
    pub fn render(&self, layout: &LayoutDocument) -> IoResult<String> {
        let frame = &layout.frame;
        let svg = render_svg(frame, layout.width, layout.height);
        let frame_json = serde_json::to_string(frame)
            .map_err(|e| IoError::Write(e.to_string()))?
            .replace("</", "<\\/");

        let mut groups: Vec<GroupEntry> = Vec::new();
        for node in &frame.nodes {
            match groups.iter_mut().find(|g| g.group == node.group) {
                Some(entry) => entry.count += 1,
                None => groups.push(GroupEntry {
                    group: node.group,
                    color: group_color(node.group),
                    count: 1,
                }),
            }
        }
        groups.sort_by_key(|g| g.group);

        let template = ViewerTemplate {
            title: &layout.title,
            node_count: frame.nodes.len(),
            link_count: frame.links.len(),
            ticks: frame.tick,
            alpha: format!("{:.4}", frame.alpha),
            groups: &groups,
            min_scale: layout.min_scale,
            max_scale: layout.max_scale,
            svg: &svg,
            frame_json: &frame_json,
        };
        template.render().map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Writer for HtmlWriter {
    fn write(&self, layout: &LayoutDocument, output: &Path) -> IoResult<()> {
        write_file(output, &self.render(layout)?)
    }

    fn format_id(&self) -> &str {
        "html"
    }
}

/// Load simulation settings from a YAML or JSON file and validate them
pub fn load_config(path: &Path) -> IoResult<SimulationConfig> {
    let ext = FormatRegistry::extension_from_path(path)
        .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;
    let content = fs::read_to_string(path)?;

    let config: SimulationConfig = match ext.to_ascii_lowercase().as_str() {
        "yaml" | "yml" => parse_yaml(&content)?,
        "json" => parse_json(&content)?,
        _ => return Err(IoError::UnsupportedFormat(ext.to_string())),
    };
    config.validate()?;
    Ok(config)
}

/// Registry of available readers and writers
pub struct FormatRegistry {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Create a registry with all default readers and writers registered
    ///
    /// Currently registers:
    /// - Readers: `JsonReader` (json), `YamlReader` (yaml, yml)
    /// - Writers: `SvgWriter` (svg), `HtmlWriter` (html), `JsonWriter` (json)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(JsonReader));
        registry.register_reader(Box::new(YamlReader));
        registry.register_writer(Box::new(SvgWriter));
        registry.register_writer(Box::new(HtmlWriter));
        registry.register_writer(Box::new(JsonWriter));
        registry
    }

    pub fn register_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn Writer> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn Reader> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Find a writer for the given output path based on its extension
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&dyn Writer> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writer_for_format(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }
}
