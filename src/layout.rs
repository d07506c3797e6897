//! Tree layout for argument graphs.
//!
//! Non-reason children are spread left to right under their parent, each in
//! a slot as wide as its subtree. A subtree is as wide as its root's own slot
//! plus the row of its non-reason children, gaps included. Reason children
//! are stacked straight above their parent and take no horizontal room.
//! Identity links are never consulted here; they are drawn over whatever the
//! tree produces.
//!
//! Every traversal uses an explicit stack, so arbitrarily deep chains lay out
//! without recursion.
//!
//! Two optional post-passes are available, both idempotent:
//! [`resolve_collisions`] and [`expand_spacing`].

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::GraphError;
use crate::geometry::{Rect, Size, Vec2};
use crate::graph::{Graph, GraphIndex};

/// Node centers in logical units, keyed by node id.
pub type Positions = BTreeMap<String, Vec2>;

/// Overlaps smaller than this are treated as touching.
const OVERLAP_EPSILON: f64 = 1e-6;

/// Configuration for [`compute_layout`] and the post-passes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct LayoutConfig {
    /// Vertical distance between a parent and its non-reason children (default: 450).
    pub row_height: f64,
    /// Horizontal gap between neighbouring sibling slots (default: 80).
    pub sibling_gap: f64,
    /// Vertical distance between stacked reasons (default: 250).
    pub reason_stack_gap: f64,
    /// Unscaled node width (default: 300). Multiplied by the rating scale.
    pub node_width: f64,
    /// Added to the scaled node width to get a node's own slot width (default: 20).
    pub node_padding: f64,
    /// Rectangle used by [`resolve_collisions`] (default: 650×450).
    pub collision_box: Size,
    /// Run [`resolve_collisions`] in [`layout_graph`] (default: false).
    pub collision_pass: bool,
    /// Run [`expand_spacing`] in [`layout_graph`] when above 1.0 (default: 1.0).
    pub spacing_factor: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 450.0,
            sibling_gap: 80.0,
            reason_stack_gap: 250.0,
            node_width: 300.0,
            node_padding: 20.0,
            collision_box: Size::new(650.0, 450.0),
            collision_pass: false,
            spacing_factor: 1.0,
        }
    }
}

/// A normalized layout: every position has `x >= 0` and `y >= 0`, and the
/// minimum over all nodes is exactly zero on both axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub positions: Positions,
    /// Bounding box of the node centers.
    pub bounds: Rect,
}

impl Layout {
    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Lay out `graph` and normalize the result, applying whichever post-passes
/// `config` enables.
pub fn layout_graph(graph: &Graph, config: &LayoutConfig) -> Result<Layout, GraphError> {
    let index = GraphIndex::build(graph);
    layout_with_index(graph, &index, config)
}

/// Like [`layout_graph`] for callers that already hold an index.
pub fn layout_with_index(
    graph: &Graph,
    index: &GraphIndex,
    config: &LayoutConfig,
) -> Result<Layout, GraphError> {
    let mut positions = compute_layout(graph, index, config)?;
    if config.collision_pass {
        let moved = resolve_collisions(&mut positions, config.collision_box);
        log::debug!("Collision pass moved {} nodes", moved);
    }
    if config.spacing_factor > 1.0 {
        expand_spacing(&mut positions, config.spacing_factor, config);
    }
    let layout = normalize_layout(positions)?;
    log::debug!(
        "Laid out {} nodes in {:.0}x{:.0}",
        layout.len(),
        layout.bounds.width,
        layout.bounds.height
    );
    Ok(layout)
}

/// Place every node, root at the origin.
///
/// Extra roots (nodes whose parent is unknown) are laid out on the root row,
/// to the right of the main tree. Nodes that no root reaches can only sit on
/// a parent cycle; the smallest such id is reported as `MalformedGraph`.
pub fn compute_layout(
    graph: &Graph,
    index: &GraphIndex,
    config: &LayoutConfig,
) -> Result<Positions, GraphError> {
    let roots = index.layout_roots()?;
    let widths = subtree_widths(graph, index, &roots, config)?;

    if widths.len() < graph.len() {
        if let Some(id) = graph.ids().find(|id| !widths.contains_key(id)) {
            return Err(GraphError::malformed(id, "parent cycle"));
        }
    }

    let mut positions = Positions::new();
    let mut right_edge: Option<f64> = None;
    for root in roots {
        let width = widths.get(root).copied().unwrap_or(0.0);
        let center = match right_edge {
            None => 0.0,
            Some(edge) => edge + config.sibling_gap + width / 2.0,
        };
        place_subtree(index, &widths, root, Vec2::new(center, 0.0), config, &mut positions)?;
        right_edge = Some(center + width / 2.0);
    }
    Ok(positions)
}

fn own_width(graph: &Graph, id: &str, config: &LayoutConfig) -> f64 {
    let scale = graph.get(id).map(|n| n.size_scale()).unwrap_or(1.0);
    config.node_width * scale + config.node_padding
}

fn row_width(children: &[String], widths: &HashMap<&str, f64>, gap: f64) -> f64 {
    if children.is_empty() {
        return 0.0;
    }
    let total: f64 = children
        .iter()
        .map(|c| widths.get(c.as_str()).copied().unwrap_or(0.0))
        .sum();
    total + gap * (children.len() - 1) as f64
}

/// `W(v) = own width + row width of the non-reason children`, post-order.
fn subtree_widths<'a>(
    graph: &Graph,
    index: &'a GraphIndex,
    roots: &[&'a str],
    config: &LayoutConfig,
) -> Result<HashMap<&'a str, f64>, GraphError> {
    let mut widths: HashMap<&str, f64> = HashMap::with_capacity(graph.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(graph.len());
    let mut stack: Vec<(&str, bool)> = roots.iter().rev().map(|r| (*r, false)).collect();

    while let Some((id, children_done)) = stack.pop() {
        if children_done {
            let own = own_width(graph, id, config);
            let row = row_width(index.non_reason_children_of(id), &widths, config.sibling_gap);
            widths.insert(id, own + row);
            continue;
        }
        if !seen.insert(id) {
            return Err(GraphError::malformed(id, "node reached twice"));
        }
        stack.push((id, true));
        for child in index.children_of(id).iter().rev() {
            stack.push((child.as_str(), false));
        }
    }
    Ok(widths)
}

fn place_subtree(
    index: &GraphIndex,
    widths: &HashMap<&str, f64>,
    root: &str,
    origin: Vec2,
    config: &LayoutConfig,
    positions: &mut Positions,
) -> Result<(), GraphError> {
    let mut stack: Vec<(&str, Vec2)> = vec![(root, origin)];
    while let Some((id, at)) = stack.pop() {
        if positions.insert(id.to_string(), at).is_some() {
            return Err(GraphError::malformed(id, "node placed twice"));
        }

        let children = index.non_reason_children_of(id);
        let mut slot = at.x - row_width(children, widths, config.sibling_gap) / 2.0;
        for child in children {
            let width = widths.get(child.as_str()).copied().unwrap_or(0.0);
            stack.push((child, Vec2::new(slot + width / 2.0, at.y + config.row_height)));
            slot += width + config.sibling_gap;
        }

        for (i, reason) in index.reasons_of(id).iter().enumerate() {
            let lift = (i + 1) as f64 * config.reason_stack_gap;
            stack.push((reason, Vec2::new(at.x, at.y - lift)));
        }
    }
    Ok(())
}

fn overlaps(a: Vec2, b: Vec2, size: Size) -> bool {
    (a.x - b.x).abs() < size.width - OVERLAP_EPSILON
        && (a.y - b.y).abs() < size.height - OVERLAP_EPSILON
}

/// Push overlapping nodes apart horizontally.
///
/// Nodes are visited in row-major order (y, then x, then id). Each node is
/// compared against the nodes already visited and, while it overlaps any of
/// them, moved right to sit exactly one box width past the rightmost
/// offender. Visited nodes never move again, so after one pass no pair
/// overlaps and a second pass is a no-op.
///
/// Returns the number of nodes moved.
pub fn resolve_collisions(positions: &mut Positions, node_box: Size) -> usize {
    let mut order: Vec<(String, Vec2)> = positions.iter().map(|(id, p)| (id.clone(), *p)).collect();
    order.sort_by(|a, b| {
        a.1.y
            .total_cmp(&b.1.y)
            .then(a.1.x.total_cmp(&b.1.x))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut settled: Vec<Vec2> = Vec::with_capacity(order.len());
    let mut moved = 0;
    for (id, mut p) in order {
        let start = p;
        while let Some(blocker_x) = settled
            .iter()
            .filter(|q| overlaps(p, **q, node_box))
            .map(|q| q.x)
            .reduce(f64::max)
        {
            p.x = blocker_x + node_box.width;
        }
        if p != start {
            moved += 1;
            positions.insert(id, p);
        }
        settled.push(p);
    }
    moved
}

/// Widen rows so neighbouring nodes are at least
/// `factor × (node_width + sibling_gap)` apart.
///
/// Rows are groups of nodes sharing the same y. Within a row, a gap that is
/// too narrow shifts that node and everything to its right. Gaps that are
/// already wide enough are left alone, which makes the pass idempotent.
pub fn expand_spacing(positions: &mut Positions, factor: f64, config: &LayoutConfig) {
    let min_separation = factor * (config.node_width + config.sibling_gap);
    let mut rows: BTreeMap<u64, Vec<(String, f64)>> = BTreeMap::new();
    for (id, p) in positions.iter() {
        rows.entry(p.y.to_bits()).or_default().push((id.clone(), p.x));
    }

    let mut shifted = 0usize;
    for row in rows.values_mut() {
        row.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        let mut shift = 0.0;
        let mut previous: Option<f64> = None;
        for (id, x) in row.iter() {
            let mut new_x = x + shift;
            if let Some(prev) = previous {
                let gap = new_x - prev;
                if gap < min_separation - OVERLAP_EPSILON {
                    shift += min_separation - gap;
                    new_x = prev + min_separation;
                }
            }
            if new_x != *x {
                if let Some(p) = positions.get_mut(id) {
                    p.x = new_x;
                    shifted += 1;
                }
            }
            previous = Some(new_x);
        }
    }
    log::debug!("Spacing pass (factor {}) shifted {} nodes", factor, shifted);
}

/// Translate positions so the minimum x and y are both zero.
///
/// Fails with `MalformedGraph` on the first non-finite coordinate.
pub fn normalize_layout(mut positions: Positions) -> Result<Layout, GraphError> {
    if let Some((id, _)) = positions.iter().find(|(_, p)| !p.is_finite()) {
        return Err(GraphError::malformed(id.clone(), "non-finite coordinate"));
    }
    let Some(bbox) = Rect::bounding(positions.values().copied()) else {
        return Ok(Layout::default());
    };
    let shift = Vec2::new(-bbox.x, -bbox.y);
    for p in positions.values_mut() {
        *p = *p + shift;
    }
    Ok(Layout {
        positions,
        bounds: Rect::new(0.0, 0.0, bbox.width, bbox.height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ArgumentNode, NodeType};

    fn tree(edges: &[(&str, Option<&str>, NodeType)]) -> Graph {
        Graph::from_nodes(edges.iter().map(|(id, parent, ty)| {
            let node = ArgumentNode::new(*id, *ty);
            match parent {
                Some(p) => node.with_parent(*p),
                None => node,
            }
        }))
    }

    fn raw(graph: &Graph) -> Positions {
        let index = GraphIndex::build(graph);
        compute_layout(graph, &index, &LayoutConfig::default()).unwrap()
    }

    // ========================================================================
    // Placement
    // ========================================================================

    #[test]
    fn test_single_root_at_origin() {
        let graph = tree(&[("r", None, NodeType::Question)]);
        let layout = layout_graph(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.get("r"), Some(Vec2::ZERO));
        assert_eq!(layout.bounds, Rect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_two_children_centered_under_root() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("b", Some("r"), NodeType::Antithesis),
        ]);
        let pos = raw(&graph);
        assert_eq!(pos["a"], Vec2::new(-200.0, 450.0));
        assert_eq!(pos["b"], Vec2::new(200.0, 450.0));
        assert_eq!(pos["r"].x, (pos["a"].x + pos["b"].x) / 2.0);
    }

    #[test]
    fn test_children_sorted_by_id_not_insertion() {
        let graph = Graph::from_nodes(vec![
            ArgumentNode::new("r", NodeType::Question),
            ArgumentNode::new("z", NodeType::Thesis).with_parent("r"),
            ArgumentNode::new("m", NodeType::Thesis).with_parent("r"),
        ]);
        let pos = raw(&graph);
        assert!(pos["m"].x < pos["z"].x);
    }

    #[test]
    fn test_reasons_stack_above_parent() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("t", Some("r"), NodeType::Thesis),
            ("x1", Some("t"), NodeType::Reason),
            ("x2", Some("t"), NodeType::Reason),
        ]);
        let pos = raw(&graph);
        let t = pos["t"];
        assert_eq!(pos["x1"], Vec2::new(t.x, t.y - 250.0));
        assert_eq!(pos["x2"], Vec2::new(t.x, t.y - 500.0));
        // Reasons do not widen the row.
        assert_eq!(t.x, 0.0);
    }

    #[test]
    fn test_subtree_width_adds_own_slot_to_child_row() {
        // a has two children, b has none.
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("b", Some("r"), NodeType::Thesis),
            ("a1", Some("a"), NodeType::Thesis),
            ("a2", Some("a"), NodeType::Thesis),
        ]);
        let pos = raw(&graph);
        // W(a) = 320 + (320 + 80 + 320), W(r) row = 1040 + 80 + 320.
        assert_eq!(pos["a"], Vec2::new(-200.0, 450.0));
        assert_eq!(pos["b"], Vec2::new(560.0, 450.0));
        assert_eq!(pos["a1"], Vec2::new(-400.0, 900.0));
        assert_eq!(pos["a2"], Vec2::new(0.0, 900.0));
        assert_eq!(pos["b"].x - pos["a"].x, 760.0);
    }

    #[test]
    fn test_leaf_width_is_own_slot() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("x", Some("a"), NodeType::Reason),
        ]);
        let index = GraphIndex::build(&graph);
        let widths = subtree_widths(&graph, &index, &["r"], &LayoutConfig::default()).unwrap();
        // Reasons take no room, so a is a leaf.
        assert_eq!(widths["a"], 320.0);
        assert_eq!(widths["r"], 640.0);
    }

    #[test]
    fn test_rating_widens_slot() {
        let graph = Graph::from_nodes(vec![
            ArgumentNode::new("r", NodeType::Question),
            ArgumentNode::new("a", NodeType::Thesis).with_parent("r").with_rating(100.0),
            ArgumentNode::new("b", NodeType::Thesis).with_parent("r"),
        ]);
        let pos = raw(&graph);
        // (545 + 320) / 2 + 80
        assert_eq!(pos["b"].x - pos["a"].x, 512.5);
    }

    #[test]
    fn test_orphan_laid_out_beside_root() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("o", Some("missing"), NodeType::Thesis),
        ]);
        let pos = raw(&graph);
        assert_eq!(pos["o"].y, 0.0);
        // Right of r's whole subtree: W(r) = 320 + 320.
        assert_eq!(pos["o"].x, 320.0 + 80.0 + 160.0);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut nodes = vec![ArgumentNode::new("n00000", NodeType::Question)];
        for i in 1..20_000 {
            nodes.push(
                ArgumentNode::new(format!("n{:05}", i), NodeType::Thesis)
                    .with_parent(format!("n{:05}", i - 1)),
            );
        }
        let layout = layout_graph(&Graph::from_nodes(nodes), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.get("n19999").unwrap().y, 19_999.0 * 450.0);
    }

    // ========================================================================
    // Failure modes
    // ========================================================================

    #[test]
    fn test_parent_cycle_is_malformed() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("b", Some("c"), NodeType::Thesis),
            ("c", Some("b"), NodeType::Thesis),
        ]);
        match layout_graph(&graph, &LayoutConfig::default()) {
            Err(GraphError::MalformedGraph { id, .. }) => assert_eq!(id, "b"),
            other => panic!("expected MalformedGraph, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_coordinate_is_malformed() {
        let mut positions = Positions::new();
        positions.insert("a".into(), Vec2::new(0.0, 0.0));
        positions.insert("b".into(), Vec2::new(f64::NAN, 0.0));
        assert!(matches!(
            normalize_layout(positions),
            Err(GraphError::MalformedGraph { id, .. }) if id == "b"
        ));
    }

    #[test]
    fn test_empty_graph_gives_empty_layout() {
        let layout = layout_graph(&Graph::new(), &LayoutConfig::default()).unwrap();
        assert!(layout.is_empty());
    }

    // ========================================================================
    // Normalization
    // ========================================================================

    #[test]
    fn test_normalize_moves_minimum_to_zero() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("b", Some("r"), NodeType::Thesis),
            ("x", Some("r"), NodeType::Reason),
        ]);
        let layout = layout_graph(&graph, &LayoutConfig::default()).unwrap();
        let min_x = layout.positions.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = layout.positions.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert_eq!((min_x, min_y), (0.0, 0.0));
        assert_eq!(layout.get("x"), Some(Vec2::new(200.0, 0.0)));
        assert_eq!(layout.bounds, Rect::new(0.0, 0.0, 400.0, 700.0));
    }

    // ========================================================================
    // Post-passes
    // ========================================================================

    #[test]
    fn test_collisions_resolved_and_idempotent() {
        let mut positions = Positions::new();
        positions.insert("a".into(), Vec2::new(0.0, 0.0));
        positions.insert("b".into(), Vec2::new(100.0, 0.0));
        positions.insert("c".into(), Vec2::new(200.0, 100.0));

        let moved = resolve_collisions(&mut positions, Size::new(650.0, 450.0));
        assert_eq!(moved, 2);
        assert_eq!(positions["b"].x, 650.0);
        assert_eq!(positions["c"].x, 1300.0);

        let snapshot = positions.clone();
        assert_eq!(resolve_collisions(&mut positions, Size::new(650.0, 450.0)), 0);
        assert_eq!(positions, snapshot);
    }

    #[test]
    fn test_touching_boxes_do_not_collide() {
        let mut positions = Positions::new();
        positions.insert("a".into(), Vec2::new(0.0, 0.0));
        positions.insert("b".into(), Vec2::new(0.0, 450.0));
        assert_eq!(resolve_collisions(&mut positions, Size::new(650.0, 450.0)), 0);
    }

    #[test]
    fn test_expand_spacing_is_idempotent() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("b", Some("r"), NodeType::Thesis),
            ("c", Some("r"), NodeType::Thesis),
        ]);
        let config = LayoutConfig::default();
        let mut positions = raw(&graph);
        expand_spacing(&mut positions, 1.2, &config);
        assert_eq!(positions["b"].x - positions["a"].x, 456.0);
        assert_eq!(positions["c"].x - positions["b"].x, 456.0);

        let snapshot = positions.clone();
        expand_spacing(&mut positions, 1.2, &config);
        assert_eq!(positions, snapshot);
    }

    #[test]
    fn test_layout_graph_applies_enabled_passes() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("t", Some("r"), NodeType::Thesis),
            ("x", Some("t"), NodeType::Reason),
        ]);
        let config = LayoutConfig {
            collision_pass: true,
            ..Default::default()
        };
        let layout = layout_graph(&graph, &config).unwrap();
        let (t, x) = (layout.get("t").unwrap(), layout.get("x").unwrap());
        assert!((t.x - x.x).abs() >= 650.0 - OVERLAP_EPSILON);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let graph = tree(&[
            ("r", None, NodeType::Question),
            ("a", Some("r"), NodeType::Thesis),
            ("b", Some("r"), NodeType::Thesis),
            ("a1", Some("a"), NodeType::Reason),
            ("b1", Some("b"), NodeType::Synthesis),
        ]);
        let config = LayoutConfig::default();
        assert_eq!(layout_graph(&graph, &config), layout_graph(&graph, &config));
    }
}
