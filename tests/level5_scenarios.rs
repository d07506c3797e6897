//! Level 5: End-to-End Scenarios
//!
//! Each test drives the full pipeline (decode, layout, controller, frame)
//! for one small, fully worked example.

mod common;

use common::{approx, approx_vec, loaded, tree, SCREEN};
use dialectic_canvas::{
    compute_layout, route_edge, DrawCommand, EdgeGeometry, EdgeKind, Graph, GraphIndex,
    GraphViewController, LayoutConfig, NodeType, RecordingCanvas, Vec2, ViewEvent,
};

// ============================================================================
// Trivial Graph
// ============================================================================

#[test]
fn test_trivial_graph() {
    let ctrl = GraphViewController::default();
    ctrl.resize(SCREEN);
    ctrl.load_json(r#"{"r": {"parent_id": null, "node_type": "question"}}"#)
        .unwrap();

    assert_eq!(ctrl.position("r"), Some(Vec2::new(0.0, 0.0)));
    assert_eq!(ctrl.selected().as_deref(), Some("r"));
    assert!(approx(ctrl.scale(), 0.9));

    let mut canvas = RecordingCanvas::new(SCREEN);
    let stats = ctrl.frame(0, &mut canvas);
    assert_eq!(stats.nodes_drawn, 0);
    assert_eq!(stats.edges_drawn, 0);
    assert_eq!(stats.total_nodes, 1);
    assert!(canvas.texts().is_empty());
}

// ============================================================================
// Two-Child Tree
// ============================================================================

#[test]
fn test_two_child_tree() {
    let (ctrl, _) = loaded(common::two_child_tree());
    let r = ctrl.position("r").unwrap();
    let a = ctrl.position("a").unwrap();
    let b = ctrl.position("b").unwrap();

    assert!(a.x < b.x);
    assert_eq!(a.y, 450.0);
    assert_eq!(b.y, 450.0);
    assert_eq!(r.x, (a.x + b.x) / 2.0);
}

// ============================================================================
// Reason Above Parent
// ============================================================================

#[test]
fn test_reason_above_parent() {
    let (ctrl, mut canvas) = loaded(tree(&[
        ("r", None, NodeType::Thesis),
        ("x", Some("r"), NodeType::Reason),
    ]));
    let r = ctrl.position("r").unwrap();
    let x = ctrl.position("x").unwrap();
    assert_eq!(x, Vec2::new(r.x, r.y - 250.0));

    ctrl.frame(0, &mut canvas);
    let commands = canvas.commands();
    let amber = slint::Color::from_rgb_u8(0xd9, 0x77, 0x06);
    assert!(commands.contains(&DrawCommand::StrokeColor(amber)));
    assert!(commands.contains(&DrawCommand::LineDash(vec![5.0, 5.0])));

    // The curve rises above the reason before coming down onto it.
    let control = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::QuadraticCurveTo { control, end } if *end == x => Some(*control),
            _ => None,
        })
        .unwrap();
    assert!(control.y < x.y);
    assert_eq!(control, Vec2::new(x.x, x.y - 50.0));
}

// ============================================================================
// Identity Edge, Short Horizontal
// ============================================================================

#[test]
fn test_identity_edge_short_horizontal() {
    let graph = Graph::from_nodes(vec![
        common::node("r", None, NodeType::Question),
        common::node("a", Some("r"), NodeType::Thesis).with_identical_to("b"),
        common::node("b", Some("r"), NodeType::Antithesis),
    ]);
    let index = GraphIndex::build(&graph);
    let raw = compute_layout(&graph, &index, &LayoutConfig::default()).unwrap();
    assert_eq!(raw["a"], Vec2::new(-200.0, 450.0));
    assert_eq!(raw["b"], Vec2::new(200.0, 450.0));

    let identity = index
        .edges(&graph)
        .into_iter()
        .find(|e| e.kind == EdgeKind::Identity)
        .unwrap();
    assert_eq!((identity.source.as_str(), identity.target.as_str()), ("a", "b"));

    let geometry = route_edge(EdgeKind::Identity, raw["a"], raw["b"], false);
    let EdgeGeometry::Quadratic(q) = geometry else {
        panic!("expected a quadratic curve, got {:?}", geometry);
    };
    assert!(approx_vec(q.p1, Vec2::new(0.0, 570.0)));

    // Normalization shifts by 200, which keeps the parity and so the bend.
    let (ctrl, mut canvas) = loaded(graph);
    ctrl.frame(0, &mut canvas);
    assert!(canvas.commands().contains(&DrawCommand::QuadraticCurveTo {
        control: Vec2::new(200.0, 570.0),
        end: Vec2::new(400.0, 450.0),
    }));
}

// ============================================================================
// Zoom Anchor
// ============================================================================

#[test]
fn test_zoom_anchor() {
    let (ctrl, mut canvas) = loaded(common::two_child_tree());
    ctrl.set_transform(1.0, Vec2::ZERO);
    let cursor = Vec2::new(700.0, 300.0);
    assert_eq!(ctrl.to_logical(cursor), cursor);

    ctrl.push_event(ViewEvent::Wheel {
        position: cursor,
        delta: -300.0,
    });
    ctrl.frame(0, &mut canvas);

    let t = ctrl.transform();
    assert!(approx(t.scale, 1.3));
    assert!(approx_vec(t.offset, Vec2::new(-210.0, -90.0)));
    assert!(approx_vec(ctrl.to_logical(cursor), cursor));
}

// ============================================================================
// Cull Threshold
// ============================================================================

fn wide_graph(children: usize) -> Graph {
    let mut nodes = vec![common::node("q", None, NodeType::Question)];
    for i in 0..children {
        nodes.push(common::node(&format!("c{:02}", i), Some("q"), NodeType::Thesis));
    }
    Graph::from_nodes(nodes)
}

#[test]
fn test_cull_threshold() {
    let (ctrl, mut canvas) = loaded(wide_graph(20));
    ctrl.set_transform(1.0, Vec2::ZERO);
    let before = ctrl.frame(0, &mut canvas);
    let cached = ctrl.cached_viewport();
    let refreshes = ctrl.cull_refresh_count();
    // c00..c08 sit at x = 0, 400, ..., 3200 and reach into the padded view.
    assert_eq!(before.nodes_drawn, 9);

    ctrl.set_transform(1.0, Vec2::new(-50.0, 0.0));
    let small = ctrl.frame(16, &mut canvas);
    assert_eq!(ctrl.cached_viewport(), cached);
    assert_eq!(ctrl.cull_refresh_count(), refreshes);
    assert_eq!(small, before);

    ctrl.set_transform(1.0, Vec2::new(-150.0, 0.0));
    ctrl.frame(32, &mut canvas);
    assert_eq!(ctrl.cull_refresh_count(), refreshes + 1);
    let moved = ctrl.cached_viewport().unwrap();
    assert!(approx(moved.x, cached.unwrap().x + 150.0));
}
