//! Level 6: Property-Based Invariant Tests
//!
//! These tests check invariants that must hold for any argument tree:
//!
//! 1. Layout is deterministic.
//! 2. Non-reason nodes on the same row keep at least the sibling gap apart.
//! 3. Reasons stack straight above their parent at fixed spacing.
//! 4. Normalized layouts start at the origin.
//! 5. screen → logical is the inverse of logical → screen.
//! 6. Wheel zoom keeps the point under the cursor fixed.
//! 7. Culling keeps every fully visible node and only returns nodes near the view.
//! 8. Ancestor chains run from the root to the parent.
//! 9. Identity curves depend only on their endpoints.

use std::collections::BTreeMap;

use dialectic_canvas::{
    layout_graph, route_identity_edge, ArgumentNode, CoordinateSystem, CullConfig, EdgeGeometry,
    EdgeManager, Graph, GraphIndex, LayoutConfig, NodeType, Positions, Rect, SelectionManager,
    Size, Transform, Vec2, ViewportCuller,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

// ── Helpers ─────────────────────────────────────────────────────────────

/// One generated node: (parent pick, type pick, rating, identity pick).
type NodeSeed = (usize, u8, Option<u8>, Option<usize>);

fn build_tree(seeds: &[NodeSeed]) -> Graph {
    let id = |i: usize| format!("n{:03}", i);
    let n = seeds.len();
    Graph::from_nodes(seeds.iter().enumerate().map(|(i, (parent, ty, rating, ident))| {
        let mut node = if i == 0 {
            ArgumentNode::new(id(0), NodeType::Question)
        } else {
            let node_type = match ty {
                0 => NodeType::Thesis,
                1 => NodeType::Antithesis,
                2 => NodeType::Synthesis,
                _ => NodeType::Reason,
            };
            ArgumentNode::new(id(i), node_type).with_parent(id(parent % i))
        };
        if let Some(r) = rating {
            node = node.with_rating(*r as f64);
        }
        if let Some(other) = ident {
            node = node.with_identical_to(id(other % n));
        }
        node
    }))
}

fn tree_strategy() -> impl Strategy<Value = Graph> {
    prop::collection::vec(
        (
            0usize..1000,
            0u8..4,
            prop::option::of(0u8..=100),
            prop::option::weighted(0.2, 0usize..1000),
        ),
        1..40,
    )
    .prop_map(|seeds| build_tree(&seeds))
}

fn point_strategy(range: f64) -> impl Strategy<Value = Vec2> {
    (-range..range, -range..range).prop_map(|(x, y)| Vec2::new(x, y))
}

fn close(a: Vec2, b: Vec2, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

fn is_plain_tree_node(graph: &Graph, index: &GraphIndex, id: &str) -> bool {
    let Ok(ancestors) = index.ancestors(graph, id) else {
        return false;
    };
    std::iter::once(id)
        .chain(ancestors.iter().map(String::as_str))
        .all(|a| graph.get(a).is_some_and(|n| !n.is_reason()))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Layout determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic(graph in tree_strategy()) {
        let config = LayoutConfig::default();
        let first = layout_graph(&graph, &config).unwrap();
        let second = layout_graph(&graph.clone(), &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. No overlap between tree nodes of the same row
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn same_row_nodes_keep_sibling_gap(graph in tree_strategy()) {
        let config = LayoutConfig::default();
        let index = GraphIndex::build(&graph);
        let layout = layout_graph(&graph, &config).unwrap();

        let mut rows: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for (id, _) in graph.iter() {
            if !is_plain_tree_node(&graph, &index, id) {
                continue;
            }
            let depth = index.ancestors(&graph, id).unwrap().len();
            rows.entry(depth).or_default().push(layout.get(id).unwrap().x);
        }
        for (depth, mut xs) in rows {
            xs.sort_by(f64::total_cmp);
            for pair in xs.windows(2) {
                prop_assert!(
                    pair[1] - pair[0] >= config.sibling_gap - EPS,
                    "row {} has nodes {} apart",
                    depth,
                    pair[1] - pair[0]
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Reason stacking
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reasons_stack_above_parent(graph in tree_strategy()) {
        let config = LayoutConfig::default();
        let index = GraphIndex::build(&graph);
        let layout = layout_graph(&graph, &config).unwrap();

        for (id, _) in graph.iter() {
            let parent = layout.get(id).unwrap();
            for (i, reason) in index.reasons_of(id).iter().enumerate() {
                let r = layout.get(reason).unwrap();
                prop_assert_eq!(r.x, parent.x);
                prop_assert!(r.y < parent.y);
                let expected = (i + 1) as f64 * config.reason_stack_gap;
                prop_assert!(((parent.y - r.y) - expected).abs() < EPS);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Normalization
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_normalized(graph in tree_strategy()) {
        let layout = layout_graph(&graph, &LayoutConfig::default()).unwrap();
        let min_x = layout.positions.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = layout.positions.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(min_x, 0.0);
        prop_assert_eq!(min_y, 0.0);
        prop_assert_eq!(layout.bounds.x, 0.0);
        prop_assert_eq!(layout.bounds.y, 0.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Transform bijection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn screen_logical_round_trip(
        p in point_strategy(1e5),
        offset in point_strategy(1e4),
        scale in 0.01f64..=3.0,
    ) {
        let t = Transform::new(scale, offset);
        let back = t.to_logical(t.to_screen(p));
        prop_assert!(close(back, p, EPS), "{:?} came back as {:?}", p, back);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Zoom anchor
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wheel_zoom_keeps_cursor_point(
        cursor in (0.0f64..1000.0, 0.0f64..1000.0),
        offset in point_strategy(5000.0),
        scale in 0.05f64..=2.0,
        delta in -500.0f64..500.0,
    ) {
        let cursor = Vec2::new(cursor.0, cursor.1);
        let mut coords = CoordinateSystem::default();
        coords.set_transform(scale, offset);
        let before = coords.to_logical(cursor);

        coords.zoom_at(cursor, coords.scale() * (1.0 - delta * 0.001));
        let after = coords.to_logical(cursor);
        prop_assert!(close(before, after, 1e-6 * (1.0 + before.length())));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Cull soundness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn culling_is_sound(
        centers in prop::collection::vec(point_strategy(20_000.0), 0..60),
        offset in point_strategy(5000.0),
        scale in 0.05f64..=3.0,
    ) {
        let screen = Size::new(1000.0, 1000.0);
        let estimate = CullConfig::default().node_estimate;
        let positions: Positions = centers
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("n{:03}", i), *c))
            .collect();
        let transform = Transform::new(scale, offset);
        let mut culler = ViewportCuller::new(CullConfig::default());
        let visible = culler.cull(&transform, screen, &positions, &[]);
        let padded = culler.cached_viewport().unwrap();
        let viewport = transform.logical_viewport(screen);

        for (id, center) in &positions {
            let aabb = Rect::centered(*center, estimate);
            if viewport.contains_rect(&aabb) {
                prop_assert!(visible.contains_node(id), "{} is on screen but culled", id);
            }
        }
        for id in &visible.nodes {
            let aabb = Rect::centered(positions[*id], estimate);
            prop_assert!(
                aabb.corners().iter().any(|c| padded.contains_point(*c)),
                "{} returned without a corner in {:?}",
                id,
                padded
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Ancestry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ancestors_run_root_to_parent(graph in tree_strategy()) {
        let index = GraphIndex::build(&graph);
        let root = index.root_id().unwrap();
        for (id, _) in graph.iter() {
            let chain = index.ancestors(&graph, id).unwrap();
            match index.parent_of(id) {
                None => {
                    prop_assert_eq!(id, root);
                    prop_assert!(chain.is_empty());
                }
                Some(parent) => {
                    prop_assert_eq!(chain.first().map(String::as_str), Some(root));
                    prop_assert_eq!(chain.last().map(String::as_str), Some(parent));
                    for pair in chain.windows(2) {
                        prop_assert_eq!(index.parent_of(&pair[1]), Some(pair[0].as_str()));
                    }
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Identity curve stability
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identity_curve_depends_only_on_endpoints(
        a in point_strategy(10_000.0),
        b in point_strategy(10_000.0),
        shift in (-50i32..50, -50i32..50),
    ) {
        prop_assert_eq!(route_identity_edge(a, b), route_identity_edge(a, b));

        // An even integer shift keeps the parity, so the curve just moves.
        let d = Vec2::new(2.0 * shift.0 as f64, 2.0 * shift.1 as f64);
        let moved = route_identity_edge(a + d, b + d);
        let original = route_identity_edge(a, b);
        let expected: Vec<Vec2> = original.control_points().into_iter().map(|p| p + d).collect();
        let actual = moved.control_points();
        prop_assert_eq!(actual.len(), expected.len());
        for (x, y) in actual.iter().zip(&expected) {
            prop_assert!(close(*x, *y, 1e-6), "{:?} vs {:?}", x, y);
        }
    }
}

proptest! {
    #[test]
    fn identity_edges_stable_across_relayout(graph in tree_strategy()) {
        let index = GraphIndex::build(&graph);
        let route = || {
            let layout = layout_graph(&graph, &LayoutConfig::default()).unwrap();
            let mut edges = EdgeManager::new(false);
            edges.set_graph(&graph, &index);
            edges.recompute(&layout.positions, &CoordinateSystem::default(), &SelectionManager::new());
            edges
                .routed()
                .iter()
                .filter(|e| matches!(e.geometry, EdgeGeometry::Quadratic(_) | EdgeGeometry::Compound { .. }))
                .map(|e| (e.key.clone(), e.geometry.clone()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(route(), route());
    }
}
