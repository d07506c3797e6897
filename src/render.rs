//! Canvas rendering.
//!
//! Drawing goes through the [`Canvas`] trait, a small subset of an HTML
//! canvas 2D context. Hosts implement it over whatever surface they own;
//! [`RecordingCanvas`] records the calls and backs the tests.
//!
//! One frame draws the edge layer first, then the node layer, both under a
//! single canvas-level transform.

use slint::Color;

use crate::cull::VisibleSet;
use crate::geometry::{Rect, Size, Vec2};
use crate::graph::{ArgumentNode, Graph, NodeType};
use crate::layout::Positions;
use crate::links::{EdgeManager, RoutedEdge};
use crate::path::{arrow_head, EdgeGeometry, EdgeStyle, ARROW_BASE, ARROW_LENGTH};
use crate::selection::SelectionManager;
use crate::state::{CoordinateSystem, NodeBounds, Transform};
use crate::thumbnails::{ImageHandle, ThumbnailCache};

/// 2D drawing surface.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> Size;
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    /// Replace the current matrix with `scale` followed by a translation.
    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64);
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    /// An empty slice means a solid line.
    fn set_line_dash(&mut self, dash: &[f64]);
    fn set_global_alpha(&mut self, alpha: f32);
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Vec2);
    fn line_to(&mut self, p: Vec2);
    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2);
    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2);
    fn close_path(&mut self);
    fn rounded_rect(&mut self, rect: Rect, radius: f64);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, at: Vec2, max_width: Option<f64>);
    fn draw_image(&mut self, image: ImageHandle, rect: Rect);
}

/// One recorded [`Canvas`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Save,
    Restore,
    SetTransform { scale: f64, tx: f64, ty: f64 },
    StrokeColor(Color),
    FillColor(Color),
    LineWidth(f64),
    LineDash(Vec<f64>),
    GlobalAlpha(f32),
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadraticCurveTo { control: Vec2, end: Vec2 },
    BezierCurveTo { c1: Vec2, c2: Vec2, end: Vec2 },
    ClosePath,
    RoundedRect { rect: Rect, radius: f64 },
    Stroke,
    Fill,
    Font(String),
    FillText { text: String, at: Vec2, max_width: Option<f64> },
    DrawImage { image: ImageHandle, rect: Rect },
}

/// Canvas that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the canvas empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Every string drawn with `fill_text`, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }
    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }
    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64) {
        self.commands.push(DrawCommand::SetTransform { scale, tx, ty });
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }
    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }
    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }
    fn set_line_dash(&mut self, dash: &[f64]) {
        self.commands.push(DrawCommand::LineDash(dash.to_vec()));
    }
    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }
    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }
    fn move_to(&mut self, p: Vec2) {
        self.commands.push(DrawCommand::MoveTo(p));
    }
    fn line_to(&mut self, p: Vec2) {
        self.commands.push(DrawCommand::LineTo(p));
    }
    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        self.commands.push(DrawCommand::QuadraticCurveTo { control, end });
    }
    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2) {
        self.commands.push(DrawCommand::BezierCurveTo { c1, c2, end });
    }
    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }
    fn rounded_rect(&mut self, rect: Rect, radius: f64) {
        self.commands.push(DrawCommand::RoundedRect { rect, radius });
    }
    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }
    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }
    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }
    fn fill_text(&mut self, text: &str, at: Vec2, max_width: Option<f64>) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at,
            max_width,
        });
    }
    fn draw_image(&mut self, image: ImageHandle, rect: Rect) {
        self.commands.push(DrawCommand::DrawImage { image, rect });
    }
}

/// Border color for a node type.
pub fn node_type_color(node_type: NodeType) -> Color {
    match node_type {
        NodeType::Thesis => Color::from_rgb_u8(0x16, 0xa3, 0x4a),
        NodeType::Antithesis => Color::from_rgb_u8(0xdc, 0x26, 0x26),
        NodeType::Synthesis => Color::from_rgb_u8(0x93, 0x33, 0xea),
        NodeType::Reason => Color::from_rgb_u8(0xd9, 0x77, 0x06),
        NodeType::Question | NodeType::Other => Color::from_rgb_u8(0x6b, 0x72, 0x80),
    }
}

/// Terminal status line and its color, if the node ends a line of argument.
pub fn terminal_status(node: &ArgumentNode) -> Option<(&'static str, Color)> {
    if node.nonsense {
        Some(("Nonsense", Color::from_rgb_u8(0xb9, 0x1c, 0x1c)))
    } else if node.identical_to.is_some() {
        Some(("Identity", Color::from_rgb_u8(0x1e, 0x40, 0xaf)))
    } else {
        None
    }
}

/// Node card appearance, in logical units.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub node_size: Size,
    pub corner_radius: f64,
    pub background: Color,
    pub border_width: f64,
    pub active_border_width: f64,
    /// Thumbnail slot on the left of the card.
    pub image_inset: f64,
    pub image_width: f64,
    pub image_placeholder: Color,
    /// Left edge of the text column.
    pub text_left: f64,
    pub summary_font: String,
    pub summary_color: Color,
    pub type_font: String,
    pub type_color: Color,
    pub status_font: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_size: Size::new(300.0, 140.0),
            corner_radius: 4.0,
            background: Color::from_rgb_u8(0xff, 0xff, 0xff),
            border_width: 1.5,
            active_border_width: 3.0,
            image_inset: 5.0,
            image_width: 110.0,
            image_placeholder: Color::from_rgb_u8(0xe5, 0xe7, 0xeb),
            text_left: 120.0,
            summary_font: "14px serif".into(),
            summary_color: Color::from_rgb_u8(0x1f, 0x29, 0x37),
            type_font: "italic 12px serif".into(),
            type_color: Color::from_rgb_u8(0x4b, 0x55, 0x63),
            status_font: "bold 12px serif".into(),
        }
    }
}

/// Counts for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub nodes_drawn: usize,
    pub edges_drawn: usize,
    pub total_nodes: usize,
}

impl RenderStats {
    /// Status line shown by hosts, e.g. `"Rendering 12 of 340 nodes"`.
    pub fn summary(&self) -> String {
        format!("Rendering {} of {} nodes", self.nodes_drawn, self.total_nodes)
    }
}

/// Everything one frame reads.
pub struct Scene<'a> {
    pub graph: &'a Graph,
    pub positions: &'a Positions,
    pub edges: &'a EdgeManager,
    pub selection: &'a SelectionManager,
    pub thumbnails: &'a ThumbnailCache,
    pub transform: Transform,
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Drawn size of a node, scaled by its rating.
    pub fn node_size(&self, node: &ArgumentNode) -> Size {
        self.style.node_size.scaled(node.size_scale())
    }

    /// Blank stage, used while the graph cannot be shown.
    pub fn draw_empty(&self, canvas: &mut dyn Canvas) -> RenderStats {
        canvas.clear();
        RenderStats::default()
    }

    /// Draw the visible part of `scene`. Drawn nodes get their bounds
    /// registered in `coords`.
    pub fn draw_frame(
        &self,
        canvas: &mut dyn Canvas,
        scene: &Scene<'_>,
        visible: &VisibleSet<'_>,
        coords: &mut CoordinateSystem,
    ) -> RenderStats {
        let mut stats = RenderStats {
            total_nodes: scene.graph.len(),
            ..Default::default()
        };

        canvas.clear();
        canvas.save();
        let t = scene.transform;
        canvas.set_transform(t.scale, t.offset.x, t.offset.y);

        // Edge layer.
        for edge in &visible.edges {
            if let Some(routed) = scene.edges.routed_for(edge) {
                self.draw_edge(canvas, routed);
                stats.edges_drawn += 1;
            }
        }

        // Node layer.
        let mut mounted: Vec<NodeBounds> = Vec::new();
        for id in &visible.nodes {
            let (Some(node), Some(center)) = (scene.graph.get(id), scene.positions.get(*id)) else {
                continue;
            };
            if node.node_type == NodeType::Question {
                continue;
            }
            let size = self.node_size(node);
            let active = scene.selection.is_on_active_path(id) || scene.selection.is_selected(id);
            self.draw_node(canvas, node, *center, size, active, scene.thumbnails.image_for(id));
            mounted.push(NodeBounds::new(*id, *center, size));
            stats.nodes_drawn += 1;
        }

        canvas.restore();

        for bounds in mounted {
            if coords.bounds(&bounds.id) != Some(&bounds) {
                coords.register_bounds(bounds);
            }
        }
        stats
    }

    fn trace(canvas: &mut dyn Canvas, geometry: &EdgeGeometry) {
        canvas.begin_path();
        canvas.move_to(geometry.start());
        match geometry {
            EdgeGeometry::Straight { to, .. } => canvas.line_to(*to),
            EdgeGeometry::Quadratic(q) => canvas.quadratic_curve_to(q.p1, q.p2),
            EdgeGeometry::Compound { head, end } => {
                canvas.bezier_curve_to(head.p1, head.p2, head.p3);
                canvas.line_to(*end);
            }
            EdgeGeometry::Polyline(points) => {
                for p in points.iter().skip(1) {
                    canvas.line_to(*p);
                }
            }
        }
    }

    fn stroke_pass(canvas: &mut dyn Canvas, geometry: &EdgeGeometry, style: &EdgeStyle) {
        canvas.set_stroke_color(style.color);
        canvas.set_line_width(style.width);
        canvas.set_line_dash(style.dash.as_ref().map(|d| d.as_slice()).unwrap_or(&[]));
        canvas.set_global_alpha(style.opacity);
        Self::trace(canvas, geometry);
        canvas.stroke();
    }

    fn draw_edge(&self, canvas: &mut dyn Canvas, routed: &RoutedEdge) {
        canvas.save();
        Self::stroke_pass(canvas, &routed.geometry, &routed.style.shadow());
        Self::stroke_pass(canvas, &routed.geometry, &routed.style);

        let (from, tip) = routed.geometry.arrow_tangent();
        if let Some([tip, left, right]) = arrow_head(from, tip, ARROW_LENGTH, ARROW_BASE) {
            canvas.set_line_dash(&[]);
            canvas.set_fill_color(routed.style.color);
            canvas.begin_path();
            canvas.move_to(tip);
            canvas.line_to(left);
            canvas.line_to(right);
            canvas.close_path();
            canvas.fill();
        }
        canvas.restore();
    }

    fn draw_node(
        &self,
        canvas: &mut dyn Canvas,
        node: &ArgumentNode,
        center: Vec2,
        size: Size,
        active: bool,
        image: Option<ImageHandle>,
    ) {
        let s = &self.style;
        let card = Rect::centered(center, size);

        canvas.save();
        canvas.set_global_alpha(1.0);
        canvas.set_line_dash(&[]);
        canvas.begin_path();
        canvas.rounded_rect(card, s.corner_radius);
        canvas.set_fill_color(s.background);
        canvas.fill();
        canvas.set_stroke_color(node_type_color(node.node_type));
        canvas.set_line_width(if active { s.active_border_width } else { s.border_width });
        canvas.stroke();

        let slot = Rect::new(
            card.x + s.image_inset,
            card.y + s.image_inset,
            s.image_width,
            (card.height - 2.0 * s.image_inset).max(0.0),
        );
        match image {
            Some(handle) => canvas.draw_image(handle, slot),
            None => {
                canvas.begin_path();
                canvas.rounded_rect(slot, s.corner_radius);
                canvas.set_fill_color(s.image_placeholder);
                canvas.fill();
            }
        }

        let text_x = card.x + s.text_left;
        let text_width = Some((card.width - s.text_left - s.image_inset * 2.0).max(0.0));
        let summary = if node.summary.trim().is_empty() {
            "Untitled Node"
        } else {
            node.summary.as_str()
        };
        canvas.set_font(&s.summary_font);
        canvas.set_fill_color(s.summary_color);
        canvas.fill_text(summary, Vec2::new(text_x, card.y + 10.0), text_width);

        canvas.set_font(&s.type_font);
        canvas.set_fill_color(s.type_color);
        canvas.fill_text(node.node_type.as_str(), Vec2::new(text_x, card.bottom() - 55.0), text_width);

        if let Some((status, color)) = terminal_status(node) {
            canvas.set_font(&s.status_font);
            canvas.set_fill_color(color);
            canvas.fill_text(status, Vec2::new(text_x, card.bottom() - 30.0), text_width);
        }
        canvas.restore();
    }
}
