//! Edge geometry: routing, arrow heads, styles and SVG path output.
//!
//! All routing functions are pure functions of the endpoint coordinates, so
//! the same pair of positions always produces the same curve.

use crate::geometry::{Rect, Vec2};
use crate::graph::EdgeKind;
use crate::state::Transform;
use slint::Color;

/// Identity edges with a horizontal run longer than this use the
/// five-point path instead of a single quadratic.
pub const LONG_IDENTITY_SPAN: f64 = 2000.0;

/// Arc height of identity curves relative to the horizontal run.
pub const IDENTITY_BULGE: f64 = 0.3;

/// How far the control point of an upward edge rises above the child,
/// relative to the vertical distance.
pub const UPWARD_LIFT: f64 = 0.2;

pub const ARROW_LENGTH: f64 = 8.0;
pub const ARROW_BASE: f64 = 8.0;

/// Curve parameter used to aim arrow heads on curved edges.
const ARROW_TANGENT_T: f64 = 0.95;

/// Quadratic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
}

impl QuadraticBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        Self { p0, p1, p2 }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        self.p0 * (mt * mt) + self.p1 * (2.0 * mt * t) + self.p2 * (t * t)
    }
}

/// Cubic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2, // Start point
    pub p1: Vec2, // Control point 1
    pub p2: Vec2, // Control point 2
    pub p3: Vec2, // End point
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f64) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }
}

/// Routed shape of one edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeGeometry {
    Straight { from: Vec2, to: Vec2 },
    Quadratic(QuadraticBezier),
    /// Long identity edge: a cubic through the first three controls, then a
    /// straight run from the last control into the target.
    Compound { head: CubicBezier, end: Vec2 },
    /// Orthogonal polyline.
    Polyline(Vec<Vec2>),
}

impl EdgeGeometry {
    pub fn start(&self) -> Vec2 {
        match self {
            Self::Straight { from, .. } => *from,
            Self::Quadratic(q) => q.p0,
            Self::Compound { head, .. } => head.p0,
            Self::Polyline(points) => points.first().copied().unwrap_or(Vec2::ZERO),
        }
    }

    pub fn end(&self) -> Vec2 {
        match self {
            Self::Straight { to, .. } => *to,
            Self::Quadratic(q) => q.p2,
            Self::Compound { end, .. } => *end,
            Self::Polyline(points) => points.last().copied().unwrap_or(Vec2::ZERO),
        }
    }

    /// Every point that defines the shape, endpoints included.
    pub fn control_points(&self) -> Vec<Vec2> {
        match self {
            Self::Straight { from, to } => vec![*from, *to],
            Self::Quadratic(q) => vec![q.p0, q.p1, q.p2],
            Self::Compound { head, end } => vec![head.p0, head.p1, head.p2, head.p3, *end],
            Self::Polyline(points) => points.clone(),
        }
    }

    /// Bounding box of the control points, which contains the whole curve.
    pub fn bounds(&self) -> Rect {
        Rect::bounding(self.control_points()).unwrap_or_default()
    }

    /// Point just before the tip and the tip itself, for aiming the arrow.
    pub fn arrow_tangent(&self) -> (Vec2, Vec2) {
        match self {
            Self::Straight { from, to } => (*from, *to),
            Self::Quadratic(q) => (q.eval(ARROW_TANGENT_T), q.eval(1.0)),
            Self::Compound { head, end } => (head.p3.lerp(*end, ARROW_TANGENT_T), *end),
            Self::Polyline(points) => match points.as_slice() {
                [.., a, b] => (*a, *b),
                _ => (self.start(), self.end()),
            },
        }
    }

    /// Sample the shape as a polyline with `samples` segments per curve.
    pub fn sample(&self, samples: usize) -> Vec<Vec2> {
        let samples = if samples == 0 { 20 } else { samples };
        match self {
            Self::Straight { from, to } => vec![*from, *to],
            Self::Quadratic(q) => (0..=samples)
                .map(|i| q.eval(i as f64 / samples as f64))
                .collect(),
            Self::Compound { head, end } => {
                let mut points: Vec<Vec2> = (0..=samples)
                    .map(|i| head.eval(i as f64 / samples as f64))
                    .collect();
                points.push(*end);
                points
            }
            Self::Polyline(points) => points.clone(),
        }
    }

    /// Minimum distance from `point` to the sampled shape.
    pub fn distance_to(&self, point: Vec2, samples: usize) -> f64 {
        let points = self.sample(samples);
        let mut min_dist_sq = f64::MAX;
        for pair in points.windows(2) {
            let dist_sq = distance_to_line_segment_sq(point, pair[0], pair[1]);
            if dist_sq < min_dist_sq {
                min_dist_sq = dist_sq;
            }
        }
        if points.len() == 1 {
            min_dist_sq = (point - points[0]).length().powi(2);
        }
        min_dist_sq.sqrt()
    }

    /// Same shape with every point mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> EdgeGeometry {
        let map = |p: Vec2| transform.to_screen(p);
        match self {
            Self::Straight { from, to } => Self::Straight {
                from: map(*from),
                to: map(*to),
            },
            Self::Quadratic(q) => Self::Quadratic(QuadraticBezier::new(map(q.p0), map(q.p1), map(q.p2))),
            Self::Compound { head, end } => Self::Compound {
                head: CubicBezier::new(map(head.p0), map(head.p1), map(head.p2), map(head.p3)),
                end: map(*end),
            },
            Self::Polyline(points) => Self::Polyline(points.iter().map(|p| map(*p)).collect()),
        }
    }

    /// SVG path command string, e.g. `"M 0 0 Q 50 -20 100 0"`.
    pub fn to_svg_path(&self) -> String {
        match self {
            Self::Straight { from, to } => {
                format!("M {} {} L {} {}", from.x, from.y, to.x, to.y)
            }
            Self::Quadratic(q) => format!(
                "M {} {} Q {} {} {} {}",
                q.p0.x, q.p0.y, q.p1.x, q.p1.y, q.p2.x, q.p2.y
            ),
            Self::Compound { head, end } => format!(
                "M {} {} C {} {} {} {} {} {} L {} {}",
                head.p0.x, head.p0.y, head.p1.x, head.p1.y, head.p2.x, head.p2.y, head.p3.x,
                head.p3.y, end.x, end.y
            ),
            Self::Polyline(points) => {
                let mut path = String::new();
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        path.push(' ');
                    }
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    path.push_str(&format!("{} {} {}", cmd, p.x, p.y));
                }
                path
            }
        }
    }
}

/// Route any edge between two node centers.
///
/// `manhattan` switches tree edges to orthogonal polylines.
pub fn route_edge(kind: EdgeKind, from: Vec2, to: Vec2, manhattan: bool) -> EdgeGeometry {
    match kind {
        EdgeKind::Identity => route_identity_edge(from, to),
        EdgeKind::Tree if manhattan => EdgeGeometry::Polyline(manhattan_points(from, to).to_vec()),
        EdgeKind::Tree | EdgeKind::Reason => route_tree_edge(kind, from, to),
    }
}

/// Parent → child edge. Downward tree edges are straight; everything else
/// arcs over the child.
pub fn route_tree_edge(kind: EdgeKind, parent: Vec2, child: Vec2) -> EdgeGeometry {
    if kind == EdgeKind::Tree && child.y > parent.y {
        return EdgeGeometry::Straight {
            from: parent,
            to: child,
        };
    }
    let control = Vec2::new(
        (parent.x + child.x) / 2.0,
        child.y - (parent.y - child.y).abs() * UPWARD_LIFT,
    );
    EdgeGeometry::Quadratic(QuadraticBezier::new(parent, control, child))
}

/// `+1.0` when `floor(x) + floor(y)` of `start` is even, else `-1.0`.
pub fn identity_bend_sign(start: Vec2) -> f64 {
    let sum = (start.x.floor() as i64).wrapping_add(start.y.floor() as i64);
    if sum.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Node → identical node.
pub fn route_identity_edge(start: Vec2, end: Vec2) -> EdgeGeometry {
    let d = end - start;
    let chord = d.length();
    let mid = start.lerp(end, 0.5);

    if d.x.abs() <= d.y.abs() || chord == 0.0 {
        let control = mid + Vec2::new(-d.y, d.x) * IDENTITY_BULGE;
        return EdgeGeometry::Quadratic(QuadraticBezier::new(start, control, end));
    }

    // Unit normal oriented towards +y, flipped by the parity hash.
    let mut normal = Vec2::new(-d.y, d.x) * (1.0 / chord);
    if normal.y < 0.0 {
        normal = normal * -1.0;
    }
    let bend = normal * (identity_bend_sign(start) * d.x.abs() * IDENTITY_BULGE);

    if d.x.abs() <= LONG_IDENTITY_SPAN {
        return EdgeGeometry::Quadratic(QuadraticBezier::new(start, mid + bend, end));
    }

    let c1 = start.lerp(end, 0.25) + bend * 0.7;
    let c2 = start.lerp(end, 0.5) + bend;
    let c3 = start.lerp(end, 0.75) + bend * 0.7;
    EdgeGeometry::Compound {
        head: CubicBezier::new(start, c1, c2, c3),
        end,
    }
}

/// Four-point orthogonal route through the midpoint. Vertical-first when
/// the edge is taller than it is wide.
pub fn manhattan_points(start: Vec2, end: Vec2) -> [Vec2; 4] {
    let mid = start.lerp(end, 0.5);
    if (end.y - start.y).abs() > (end.x - start.x).abs() {
        [start, Vec2::new(start.x, mid.y), Vec2::new(end.x, mid.y), end]
    } else {
        [start, Vec2::new(mid.x, start.y), Vec2::new(mid.x, end.y), end]
    }
}

/// Triangle `[tip, left, right]` pointing along `from → tip`, or `None` when
/// the direction is degenerate.
pub fn arrow_head(from: Vec2, tip: Vec2, length: f64, base: f64) -> Option<[Vec2; 3]> {
    let dir = tip - from;
    let len = dir.length();
    if !(len > f64::EPSILON) || !len.is_finite() {
        return None;
    }
    let unit = dir * (1.0 / len);
    let back = tip - unit * length;
    let normal = Vec2::new(-unit.y, unit.x) * (base / 2.0);
    Some([tip, back + normal, back - normal])
}

/// Stroke styling for one edge kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: Color,
    pub dash: Option<[f64; 2]>,
    pub width: f64,
    pub opacity: f32,
}

impl EdgeStyle {
    pub const SHADOW_WIDTH: f64 = 3.0;
    pub const SHADOW_OPACITY: f32 = 0.3;

    pub fn for_kind(kind: EdgeKind) -> Self {
        let (color, dash) = match kind {
            EdgeKind::Tree => (Color::from_rgb_u8(0x4b, 0x55, 0x63), None),
            EdgeKind::Reason => (Color::from_rgb_u8(0xd9, 0x77, 0x06), Some([5.0, 5.0])),
            EdgeKind::Identity => (Color::from_rgb_u8(0x3b, 0x82, 0xf6), Some([4.0, 4.0])),
        };
        Self {
            color,
            dash,
            width: 2.0,
            opacity: 0.8,
        }
    }

    /// The dark under-stroke drawn before the main stroke.
    pub fn shadow(&self) -> Self {
        Self {
            color: Color::from_rgb_u8(0x11, 0x18, 0x27),
            dash: self.dash,
            width: Self::SHADOW_WIDTH,
            opacity: Self::SHADOW_OPACITY,
        }
    }

    /// Heavier stroke for edges on the active path.
    pub fn highlighted(&self) -> Self {
        Self {
            width: 3.0,
            opacity: 1.0,
            ..*self
        }
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;

    if ab_len_sq < f64::EPSILON {
        // Degenerate segment (a == b)
        return ap.x * ap.x + ap.y * ap.y;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    let d = point - closest;
    d.x * d.x + d.y * d.y
}
