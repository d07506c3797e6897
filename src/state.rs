//! Logical ↔ screen transform and the node bounds registry.
//!
//! `screen = logical * scale + offset`. The coordinate system only stores
//! state; nothing here notifies anyone. The controller decides when a
//! transform change is worth telling the host about.

use std::collections::HashMap;

use crate::geometry::{Rect, Size, Vec2};

/// Drawn extent of a node in logical units. The center anchors incident edges.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBounds {
    pub id: String,
    pub center: Vec2,
    pub width: f64,
    pub height: f64,
}

impl NodeBounds {
    pub fn new(id: impl Into<String>, center: Vec2, size: Size) -> Self {
        Self {
            id: id.into(),
            center,
            width: size.width,
            height: size.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.center, Size::new(self.width, self.height))
    }
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Transform {
    pub fn new(scale: f64, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    pub fn to_screen(&self, logical: Vec2) -> Vec2 {
        logical * self.scale + self.offset
    }

    pub fn to_logical(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) * (1.0 / self.scale)
    }

    /// The transform with `new_scale` that keeps the logical point under
    /// `anchor` (a screen position) where it is.
    pub fn zoomed_at(&self, anchor: Vec2, new_scale: f64) -> Transform {
        let logical = (anchor - self.offset) * (1.0 / self.scale);
        Transform::new(new_scale, anchor - logical * new_scale)
    }

    /// The logical rectangle covered by a screen of `screen` pixels.
    pub fn logical_viewport(&self, screen: Size) -> Rect {
        Rect::new(
            -self.offset.x / self.scale,
            -self.offset.y / self.scale,
            screen.width / self.scale,
            screen.height / self.scale,
        )
    }

    /// Map a screen rectangle into logical space.
    pub fn rect_to_logical(&self, screen: Rect) -> Rect {
        let origin = self.to_logical(Vec2::new(screen.x, screen.y));
        Rect::new(
            origin.x,
            origin.y,
            screen.width / self.scale,
            screen.height / self.scale,
        )
    }
}

/// Current transform plus every registered [`NodeBounds`].
#[derive(Debug, Clone)]
pub struct CoordinateSystem {
    transform: Transform,
    min_scale: f64,
    max_scale: f64,
    bounds: HashMap<String, NodeBounds>,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(0.01, 3.0)
    }
}

impl CoordinateSystem {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        Self {
            transform: Transform::default(),
            min_scale,
            max_scale,
            bounds: HashMap::new(),
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.transform.offset
    }

    /// Clamp to `[min_scale, max_scale]`. An inverted range pins to `max_scale`.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    /// Replace the transform. The scale is clamped to the configured range;
    /// non-finite input is ignored.
    pub fn set_transform(&mut self, scale: f64, offset: Vec2) {
        if !scale.is_finite() || !offset.is_finite() {
            log::warn!("Ignoring non-finite transform ({}, {:?})", scale, offset);
            return;
        }
        self.transform = Transform::new(self.clamp_scale(scale), offset);
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        let scale = self.transform.scale;
        self.set_transform(scale, offset);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        let offset = self.transform.offset + delta;
        self.set_offset(offset);
    }

    /// Zoom to `new_scale` (clamped) keeping the logical point under the
    /// screen position `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Vec2, new_scale: f64) {
        let zoomed = self.transform.zoomed_at(anchor, self.clamp_scale(new_scale));
        self.set_transform(zoomed.scale, zoomed.offset);
    }

    pub fn to_screen(&self, logical: Vec2) -> Vec2 {
        self.transform.to_screen(logical)
    }

    pub fn to_logical(&self, screen: Vec2) -> Vec2 {
        self.transform.to_logical(screen)
    }

    pub fn logical_viewport(&self, screen: Size) -> Rect {
        self.transform.logical_viewport(screen)
    }

    // === Bounds registry ===

    pub fn register_bounds(&mut self, bounds: NodeBounds) {
        self.bounds.insert(bounds.id.clone(), bounds);
    }

    /// Register bounds reported by a host in screen space.
    pub fn handle_node_rect_report(&mut self, id: &str, screen: Rect) {
        let logical = self.transform.rect_to_logical(screen);
        self.register_bounds(NodeBounds::new(
            id,
            logical.center(),
            Size::new(logical.width, logical.height),
        ));
    }

    pub fn bounds(&self, id: &str) -> Option<&NodeBounds> {
        self.bounds.get(id)
    }

    /// Edge anchor for a node: the center of its registered bounds.
    pub fn anchor(&self, id: &str) -> Option<Vec2> {
        self.bounds.get(id).map(|b| b.center)
    }

    pub fn all_bounds(&self) -> impl Iterator<Item = &NodeBounds> + '_ {
        self.bounds.values()
    }

    pub fn remove_bounds(&mut self, id: &str) -> Option<NodeBounds> {
        self.bounds.remove(id)
    }

    pub fn clear_bounds(&mut self) {
        self.bounds.clear();
    }

    pub fn bounds_count(&self) -> usize {
        self.bounds.len()
    }
}
