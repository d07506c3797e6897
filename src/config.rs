//! Host-facing configuration.
//!
//! [`GraphViewConfig`] collects every tunable constant of the view in one
//! serde-friendly struct. Component code never reads it directly; it works
//! on the projections returned by [`GraphViewConfig::layout`] and
//! [`GraphViewConfig::culling`].

use crate::cull::CullConfig;
use crate::error::GraphError;
use crate::geometry::Size;
use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Options recognised by the graph view.
///
/// Missing JSON fields keep their defaults, so `{"rowHeight": 500}` is a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct GraphViewConfig {
    /// Vertical gap between tree depths.
    pub row_height: f64,
    /// Minimum horizontal gap between non-reason siblings.
    pub sibling_gap: f64,
    /// Vertical gap between stacked reasons above a parent.
    pub reason_stack_gap: f64,
    /// Horizontal padding added to a node's own width when sizing subtrees.
    pub node_padding: f64,
    /// Drawn node rectangle before rating scaling.
    pub node_size: Size,
    /// Rectangle used by the collision pass.
    pub collision_node_box: Size,
    pub collision_pass: bool,
    /// Extra-spacing pass strength; values `<= 1.0` leave the layout alone.
    pub spacing_factor: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale used by the reset action.
    pub initial_scale: f64,
    pub cull_padding: f64,
    pub cull_disable_scale: f64,
    pub cull_threshold: f64,
    /// Node size assumed by the culler.
    pub node_estimate: Size,
    /// Wheel sensitivity; a wheel delta `d` multiplies scale by `1 - d * zoom_speed`.
    pub zoom_speed: f64,
    /// Scale increment of the zoom-in / zoom-out actions.
    pub zoom_step: f64,
    pub fit_padding: f64,
    pub fit_margin: f64,
    /// Delay before edges are refreshed after a drag ends.
    pub refresh_delay_ms: u64,
    /// Pointer travel (screen pixels) below which press + release is a click.
    pub click_slop: f64,
    pub manhattan_tree_edges: bool,
}

impl Default for GraphViewConfig {
    fn default() -> Self {
        Self {
            row_height: 450.0,
            sibling_gap: 80.0,
            reason_stack_gap: 250.0,
            node_padding: 20.0,
            node_size: Size::new(300.0, 140.0),
            collision_node_box: Size::new(650.0, 450.0),
            collision_pass: false,
            spacing_factor: 1.0,
            min_scale: 0.01,
            max_scale: 3.0,
            initial_scale: 0.7,
            cull_padding: 2000.0,
            cull_disable_scale: 0.05,
            cull_threshold: 100.0,
            node_estimate: Size::new(400.0, 200.0),
            zoom_speed: 0.001,
            zoom_step: 0.1,
            fit_padding: 500.0,
            fit_margin: 0.9,
            refresh_delay_ms: 100,
            click_slop: 4.0,
            manhattan_tree_edges: false,
        }
    }
}

impl GraphViewConfig {
    /// Decode a configuration from JSON, rejecting values that would make the
    /// view unusable (non-positive sizes, inverted scale range).
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let config: GraphViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        let positive = [
            ("rowHeight", self.row_height),
            ("reasonStackGap", self.reason_stack_gap),
            ("nodeSize.width", self.node_size.width),
            ("nodeSize.height", self.node_size.height),
            ("collisionNodeBox.width", self.collision_node_box.width),
            ("collisionNodeBox.height", self.collision_node_box.height),
            ("minScale", self.min_scale),
            ("zoomSpeed", self.zoom_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GraphError::InvalidInput(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.sibling_gap < 0.0 || self.node_padding < 0.0 {
            return Err(GraphError::InvalidInput(
                "siblingGap and nodePadding must not be negative".into(),
            ));
        }
        if !(self.max_scale >= self.min_scale) {
            return Err(GraphError::InvalidInput(format!(
                "maxScale {} is below minScale {}",
                self.max_scale, self.min_scale
            )));
        }
        Ok(())
    }

    /// Clamp to `[min_scale, max_scale]`. An inverted range pins to `max_scale`.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            row_height: self.row_height,
            sibling_gap: self.sibling_gap,
            reason_stack_gap: self.reason_stack_gap,
            node_width: self.node_size.width,
            node_padding: self.node_padding,
            collision_box: self.collision_node_box,
            collision_pass: self.collision_pass,
            spacing_factor: self.spacing_factor,
        }
    }

    pub fn culling(&self) -> CullConfig {
        CullConfig {
            padding: self.cull_padding,
            disable_below_scale: self.cull_disable_scale,
            threshold: self.cull_threshold,
            node_estimate: self.node_estimate,
        }
    }
}
