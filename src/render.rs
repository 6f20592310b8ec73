//! Render boundary
//!
//! The simulation hands out read-only [`Frame`] snapshots; anything that
//! draws them implements [`RenderAdapter`]. Adapters never write back into
//! the simulation.

use std::fmt::Write as _;

use serde::Serialize;

use crate::view::BoundingBox;

/// d3 category10 palette, indexed by group
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Margin around the layout in SVG output, in world units
const SVG_MARGIN: f64 = 10.0;

/// Fill color for a node group
pub fn group_color(group: u32) -> &'static str {
    PALETTE[group as usize % PALETTE.len()]
}

/// Node position at one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub group: u32,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub pinned: bool,
}

impl NodeFrame {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Link endpoints at one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Read-only snapshot of the simulation after a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub alpha: f64,
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
}

impl Frame {
    pub fn node(&self, id: &str) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| n.id == id)
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

/// Something that draws frames
pub trait RenderAdapter {
    fn render(&mut self, frame: &Frame);
}

/// Keeps every frame it is handed
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<Frame>,
}

impl FrameRecorder {
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl RenderAdapter for FrameRecorder {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

/// Renders frames to an SVG document, keeping the latest
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    width: f64,
    height: f64,
    svg: String,
}

impl SvgRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            svg: String::new(),
        }
    }

    /// Latest rendered document (empty before the first frame)
    pub fn svg(&self) -> &str {
        &self.svg
    }
}

impl RenderAdapter for SvgRenderer {
    fn render(&mut self, frame: &Frame) {
        self.svg = render_svg(frame, self.width, self.height);
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a frame as a standalone SVG document.
///
/// The viewBox wraps the layout with a small margin so the drawing scales to
/// any `width`/`height`.
pub fn render_svg(frame: &Frame, width: f64, height: f64) -> String {
    let bounds = frame.bounds();
    let view = if bounds.is_empty() {
        BoundingBox {
            min_x: 0.0,
            max_x: width,
            min_y: 0.0,
            max_y: height,
        }
    } else {
        bounds.padded(SVG_MARGIN)
    };

    let mut svg = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{:.2} {:.2} {:.2} {:.2}">"#,
        width,
        height,
        view.min_x,
        view.min_y,
        view.max_x - view.min_x,
        view.max_y - view.min_y,
    );

    let _ = writeln!(svg, r##"  <g class="links" stroke="#999" stroke-opacity="0.6">"##);
    for link in &frame.links {
        let _ = writeln!(
            svg,
            r#"    <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke-width="{:.2}"/>"#,
            link.x1,
            link.y1,
            link.x2,
            link.y2,
            link.weight.sqrt(),
        );
    }
    let _ = writeln!(svg, "  </g>");

    let _ = writeln!(svg, r##"  <g class="nodes" stroke="#fff" stroke-width="1.5">"##);
    for node in &frame.nodes {
        let _ = writeln!(
            svg,
            r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"><title>{}&#10;Group: {}&#10;Size: {}</title></circle>"#,
            node.x,
            node.y,
            node.radius,
            group_color(node.group),
            escape_xml(node.display_label()),
            node.group,
            node.radius,
        );
    }
    let _ = writeln!(svg, "  </g>");

    let _ = writeln!(
        svg,
        r##"  <g class="labels" fill="#fff" font-family="Arial, sans-serif" font-size="12" font-weight="bold" text-anchor="middle" dominant-baseline="middle" pointer-events="none">"##
    );
    for node in &frame.nodes {
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}">{}</text>"#,
            node.x,
            node.y,
            escape_xml(node.display_label()),
        );
    }
    let _ = writeln!(svg, "  </g>");
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_frame() -> Frame {
        Frame {
            tick: 3,
            alpha: 0.5,
            nodes: vec![
                NodeFrame {
                    id: "a".to_string(),
                    label: None,
                    group: 0,
                    radius: 5.0,
                    x: 0.0,
                    y: 0.0,
                    pinned: false,
                },
                NodeFrame {
                    id: "b".to_string(),
                    label: Some("B & co".to_string()),
                    group: 1,
                    radius: 5.0,
                    x: 100.0,
                    y: 0.0,
                    pinned: true,
                },
            ],
            links: vec![LinkFrame {
                source: "a".to_string(),
                target: "b".to_string(),
                weight: 4.0,
                x1: 0.0,
                y1: 0.0,
                x2: 100.0,
                y2: 0.0,
            }],
        }
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(group_color(0), "#1f77b4");
        assert_eq!(group_color(10), "#1f77b4");
        assert_eq!(group_color(3), "#d62728");
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
    }

    #[test]
    fn frame_bounds_cover_radii() {
        let bounds = two_node_frame().bounds();
        assert_eq!((bounds.min_x, bounds.max_x), (-5.0, 105.0));
        assert_eq!((bounds.min_y, bounds.max_y), (-5.0, 5.0));
    }

    #[test]
    fn recorder_keeps_frames_in_order() {
        let mut recorder = FrameRecorder::default();
        let mut frame = two_node_frame();
        recorder.render(&frame);
        frame.tick = 4;
        recorder.render(&frame);

        assert_eq!(recorder.frames.len(), 2);
        assert_eq!(recorder.last().map(|f| f.tick), Some(4));
    }

    #[test]
    fn svg_renderer_keeps_latest_document() {
        let mut renderer = SvgRenderer::new(400.0, 300.0);
        assert!(renderer.svg().is_empty());
        renderer.render(&two_node_frame());
        assert!(renderer.svg().starts_with("<svg"));
    }

    #[test]
    fn empty_frame_uses_canvas_viewbox() {
        let svg = render_svg(&Frame::default(), 400.0, 300.0);
        assert!(svg.contains(r#"viewBox="0.00 0.00 400.00 300.00""#));
    }

    #[test]
    fn frame_serializes_to_json() {
        let json = serde_json::to_value(two_node_frame()).unwrap();
        assert_eq!(json["tick"], 3);
        assert_eq!(json["nodes"][1]["label"], "B & co");
        assert!(json["nodes"][0].get("label").is_none());
        assert_eq!(json["links"][0]["x2"], 100.0);
    }

    #[test]
    fn snapshot_svg() {
        let svg = render_svg(&two_node_frame(), 900.0, 700.0);
        insta::assert_snapshot!(svg, @r##"
        <svg xmlns="http://www.w3.org/2000/svg" width="900" height="700" viewBox="-15.00 -15.00 130.00 30.00">
          <g class="links" stroke="#999" stroke-opacity="0.6">
            <line x1="0.00" y1="0.00" x2="100.00" y2="0.00" stroke-width="2.00"/>
          </g>
          <g class="nodes" stroke="#fff" stroke-width="1.5">
            <circle cx="0.00" cy="0.00" r="5.00" fill="#1f77b4"><title>a&#10;Group: 0&#10;Size: 5</title></circle>
            <circle cx="100.00" cy="0.00" r="5.00" fill="#ff7f0e"><title>B &amp; co&#10;Group: 1&#10;Size: 5</title></circle>
          </g>
          <g class="labels" fill="#fff" font-family="Arial, sans-serif" font-size="12" font-weight="bold" text-anchor="middle" dominant-baseline="middle" pointer-events="none">
            <text x="0.00" y="0.00">a</text>
            <text x="100.00" y="0.00">B &amp; co</text>
          </g>
        </svg>
        "##);
    }
}
