//! Viewport culling.
//!
//! The culler keeps a cached, padded logical viewport and only refreshes it
//! once the live viewport drifts past a threshold. Small pans therefore
//! return exactly the same visible set, which keeps the renderer from
//! churning on every pointer move.

use std::collections::HashSet;

use crate::geometry::{Rect, Size, Vec2};
use crate::graph::GraphEdge;
use crate::layout::Positions;
use crate::state::Transform;

/// Culling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct CullConfig {
    /// Screen-independent padding, divided by scale before use (default: 2000).
    pub padding: f64,
    /// Below this scale everything is visible (default: 0.05).
    pub disable_below_scale: f64,
    /// Drift in logical units that forces a refresh of the cached viewport (default: 100).
    pub threshold: f64,
    /// Node extent assumed for visibility tests (default: 400×200).
    pub node_estimate: Size,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            padding: 2000.0,
            disable_below_scale: 0.05,
            threshold: 100.0,
            node_estimate: Size::new(400.0, 200.0),
        }
    }
}

/// Nodes and edges that survived culling, in id / edge order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibleSet<'a> {
    pub nodes: Vec<&'a str>,
    pub edges: Vec<&'a GraphEdge>,
}

impl<'a> VisibleSet<'a> {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.binary_search(&id).is_ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportCuller {
    config: CullConfig,
    cached: Option<Rect>,
    refreshes: usize,
}

impl ViewportCuller {
    pub fn new(config: CullConfig) -> Self {
        Self {
            config,
            cached: None,
            refreshes: 0,
        }
    }

    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    /// Padded logical viewport for `transform` on a screen of `screen` pixels.
    pub fn padded_viewport(&self, transform: &Transform, screen: Size) -> Rect {
        transform
            .logical_viewport(screen)
            .expand(self.config.padding / transform.scale)
    }

    /// Refresh the cached viewport if the live one drifted past the
    /// threshold on any of x, y, width or height. Returns whether it did.
    pub fn update(&mut self, transform: &Transform, screen: Size) -> bool {
        let live = self.padded_viewport(transform, screen);
        let stale = match self.cached {
            None => true,
            Some(cached) => {
                let t = self.config.threshold;
                (live.x - cached.x).abs() > t
                    || (live.y - cached.y).abs() > t
                    || (live.width - cached.width).abs() > t
                    || (live.height - cached.height).abs() > t
            }
        };
        if stale {
            self.cached = Some(live);
            self.refreshes += 1;
            log::debug!("Cull viewport refreshed: {:?}", live);
        }
        stale
    }

    /// Drop the cached viewport; the next [`update`](Self::update) refreshes.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn cached_viewport(&self) -> Option<Rect> {
        self.cached
    }

    /// How many times the cached viewport has been refreshed.
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    pub fn culling_enabled(&self, scale: f64) -> bool {
        scale >= self.config.disable_below_scale
    }

    /// Whether a node centered at `center` intersects the cached viewport.
    /// Without a cached viewport nothing is visible.
    pub fn is_node_visible(&self, center: Vec2, scale: f64) -> bool {
        if !self.culling_enabled(scale) {
            return true;
        }
        match self.cached {
            Some(view) => Rect::centered(center, self.config.node_estimate).intersects(&view),
            None => false,
        }
    }

    /// Visible nodes and the edges with at least one visible endpoint.
    pub fn visible<'a>(
        &self,
        positions: &'a Positions,
        edges: &'a [GraphEdge],
        scale: f64,
    ) -> VisibleSet<'a> {
        let nodes: Vec<&str> = positions
            .iter()
            .filter(|(_, center)| self.is_node_visible(**center, scale))
            .map(|(id, _)| id.as_str())
            .collect();
        let lookup: HashSet<&str> = nodes.iter().copied().collect();
        let edges = edges
            .iter()
            .filter(|e| lookup.contains(e.source.as_str()) || lookup.contains(e.target.as_str()))
            .collect();
        VisibleSet { nodes, edges }
    }

    /// [`update`](Self::update) followed by [`visible`](Self::visible).
    pub fn cull<'a>(
        &mut self,
        transform: &Transform,
        screen: Size,
        positions: &'a Positions,
        edges: &'a [GraphEdge],
    ) -> VisibleSet<'a> {
        self.update(transform, screen);
        self.visible(positions, edges, transform.scale)
    }
}
