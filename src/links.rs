//! Derived edge management.
//!
//! [`EdgeManager`] owns the edges derived from the graph and their routed
//! geometry in logical space. Geometry is recomputed only when the
//! controller says so (positions, selection, or a significant transform
//! change); while dragging, the canvas transform moves the cached curves.
//!
//! # Example
//!
//! ```ignore
//! let mut edges = EdgeManager::new(false);
//! edges.set_graph(&graph, &index);
//! edges.recompute(&layout.positions, &coords, &selection);
//!
//! // Optional: mirror screen-space paths into a Slint model
//! let model = Rc::new(VecModel::<EdgePath>::default());
//! edges.bind_model(model.clone(), |key, path, color, width| EdgePath { key, path, color, width });
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use slint::{Model, SharedString, VecModel};

use crate::geometry::Vec2;
use crate::graph::{Graph, GraphEdge, GraphIndex};
use crate::hit_test::{find_edge_at, EdgeShape};
use crate::layout::Positions;
use crate::path::{route_edge, EdgeGeometry, EdgeStyle};
use crate::selection::SelectionManager;
use crate::state::{CoordinateSystem, Transform};

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, edges: &[RoutedEdge], transform: &Transform);
}

/// Concrete implementation of ModelSyncer for a specific path type.
struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(SharedString, SharedString, slint::Color, f32) -> P,
{
    fn sync(&self, edges: &[RoutedEdge], transform: &Transform) {
        for (i, edge) in edges.iter().enumerate() {
            let path = edge.geometry.transformed(transform).to_svg_path();
            let item = (self.constructor)(
                SharedString::from(edge.key.as_str()),
                SharedString::from(path.as_str()),
                edge.style.color,
                (edge.style.width * transform.scale) as f32,
            );
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > edges.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// An edge with its logical-space geometry and resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub edge: GraphEdge,
    pub key: String,
    pub geometry: EdgeGeometry,
    pub style: EdgeStyle,
    pub highlighted: bool,
}

impl EdgeShape for RoutedEdge {
    fn key(&self) -> &str {
        &self.key
    }
    fn geometry(&self) -> &EdgeGeometry {
        &self.geometry
    }
}

pub struct EdgeManager {
    edges: Vec<GraphEdge>,
    routed: Vec<RoutedEdge>,
    by_key: HashMap<String, usize>,
    manhattan_tree_edges: bool,
    dirty: bool,
    recomputes: usize,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl std::fmt::Debug for EdgeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeManager")
            .field("edges", &self.edges.len())
            .field("routed", &self.routed.len())
            .field("dirty", &self.dirty)
            .field("recomputes", &self.recomputes)
            .finish()
    }
}

impl EdgeManager {
    pub fn new(manhattan_tree_edges: bool) -> Self {
        Self {
            edges: Vec::new(),
            routed: Vec::new(),
            by_key: HashMap::new(),
            manhattan_tree_edges,
            dirty: false,
            recomputes: 0,
            syncer: None,
        }
    }

    /// Bind to a Slint model for automatic synchronization.
    ///
    /// Every [`recompute`](Self::recompute) then pushes one row per routed
    /// edge, built from (key, screen-space SVG path, color, screen line width).
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString, slint::Color, f32) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Replace the edge set with the edges derived from `graph`.
    pub fn set_graph(&mut self, graph: &Graph, index: &GraphIndex) {
        self.edges = index.edges(graph);
        self.routed.clear();
        self.by_key.clear();
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.routed.clear();
        self.by_key.clear();
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Derived edges, routed or not.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn routed(&self) -> &[RoutedEdge] {
        &self.routed
    }

    pub fn get(&self, key: &str) -> Option<&RoutedEdge> {
        self.by_key.get(key).and_then(|&i| self.routed.get(i))
    }

    /// Route `edge` if it has been routed, looked up by key.
    pub fn routed_for(&self, edge: &GraphEdge) -> Option<&RoutedEdge> {
        self.get(&edge.key())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    /// Route every edge whose endpoints both have an anchor.
    ///
    /// Anchors are registered node bounds centers, falling back to layout
    /// positions for nodes that were never drawn. Edges with a missing end
    /// are skipped.
    pub fn recompute(
        &mut self,
        positions: &Positions,
        coords: &CoordinateSystem,
        selection: &SelectionManager,
    ) {
        let anchor = |id: &str| -> Option<Vec2> {
            coords.anchor(id).or_else(|| positions.get(id).copied())
        };

        self.routed.clear();
        self.by_key.clear();
        for edge in &self.edges {
            let (Some(from), Some(to)) = (anchor(&edge.source), anchor(&edge.target)) else {
                continue;
            };
            let highlighted = selection.is_edge_highlighted(&edge.source, &edge.target);
            let base = EdgeStyle::for_kind(edge.kind);
            let routed = RoutedEdge {
                key: edge.key(),
                geometry: route_edge(edge.kind, from, to, self.manhattan_tree_edges),
                style: if highlighted { base.highlighted() } else { base },
                highlighted,
                edge: edge.clone(),
            };
            self.by_key.insert(routed.key.clone(), self.routed.len());
            self.routed.push(routed);
        }
        self.dirty = false;
        self.recomputes += 1;
        log::debug!("Routed {} of {} edges", self.routed.len(), self.edges.len());

        self.sync_model(&coords.transform());
    }

    /// Push screen-space paths to the bound model, if any.
    pub fn sync_model(&self, transform: &Transform) {
        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.routed, transform);
        }
    }

    /// Key of the routed edge nearest to a logical point, within `tolerance`.
    pub fn find_at(&self, point: Vec2, tolerance: f64) -> Option<&str> {
        find_edge_at(point, &self.routed, tolerance, 20)
    }
}
