//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dialectic_canvas::{
    ArgumentNode, Graph, GraphError, GraphViewController, NodeType, RecordingCanvas, Rect, Size,
    Vec2,
};

pub const SCREEN: Size = Size::new(1000.0, 1000.0);

/// Shorthand for one node.
pub fn node(id: &str, parent: Option<&str>, node_type: NodeType) -> ArgumentNode {
    let n = ArgumentNode::new(id, node_type);
    match parent {
        Some(p) => n.with_parent(p),
        None => n,
    }
}

/// Build a graph from `(id, parent, type)` triples.
pub fn tree(entries: &[(&str, Option<&str>, NodeType)]) -> Graph {
    Graph::from_nodes(entries.iter().map(|(id, parent, ty)| node(id, *parent, *ty)))
}

/// Question `r` with thesis `a` and antithesis `b`.
pub fn two_child_tree() -> Graph {
    tree(&[
        ("r", None, NodeType::Question),
        ("a", Some("r"), NodeType::Thesis),
        ("b", Some("r"), NodeType::Antithesis),
    ])
}

/// A small but complete debate:
///
/// ```text
///            q
///      +-----+-----+
///      t     u     s
///     / \          |
///   t1   t2        s1
/// ```
///
/// with reasons `rt` (on `t`) and `ru1`, `ru2` (on `u`), and `s1` declared
/// identical to `t2`.
pub fn debate() -> Graph {
    Graph::from_nodes(vec![
        node("q", None, NodeType::Question).with_summary("Is it so?"),
        node("t", Some("q"), NodeType::Thesis).with_summary("Yes"),
        node("u", Some("q"), NodeType::Antithesis).with_summary("No"),
        node("s", Some("q"), NodeType::Synthesis).with_summary("Partly"),
        node("t1", Some("t"), NodeType::Antithesis),
        node("t2", Some("t"), NodeType::Synthesis).with_rating(90.0),
        node("s1", Some("s"), NodeType::Thesis).with_identical_to("t2"),
        node("rt", Some("t"), NodeType::Reason),
        node("ru1", Some("u"), NodeType::Reason),
        node("ru2", Some("u"), NodeType::Reason),
    ])
}

/// `n` nodes in a single parent chain.
pub fn chain(n: usize) -> Graph {
    Graph::from_nodes((0..n).map(|i| {
        let id = format!("n{:06}", i);
        if i == 0 {
            ArgumentNode::new(id, NodeType::Question)
        } else {
            ArgumentNode::new(id, NodeType::Thesis).with_parent(format!("n{:06}", i - 1))
        }
    }))
}

/// A balanced tree with `n` nodes and the given fan-out; every fifth node is
/// a reason and every seventh declares identity with its predecessor.
pub fn bushy(n: usize, fan_out: usize) -> Graph {
    Graph::from_nodes((0..n).map(|i| {
        let id = format!("n{:06}", i);
        if i == 0 {
            return ArgumentNode::new(id, NodeType::Question);
        }
        let ty = if i % 5 == 0 {
            NodeType::Reason
        } else if i % 2 == 0 {
            NodeType::Antithesis
        } else {
            NodeType::Thesis
        };
        let parent = format!("n{:06}", (i - 1) / fan_out);
        let node = ArgumentNode::new(id, ty).with_parent(parent);
        if i % 7 == 0 {
            node.with_identical_to(format!("n{:06}", i - 1))
        } else {
            node
        }
    }))
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub fn approx_vec(a: Vec2, b: Vec2) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

/// Tracks callback invocations for testing.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (id, active path)
    pub selected: Rc<RefCell<Vec<(String, Vec<String>)>>>,
    /// (scale, offset, logical viewport)
    pub viewport: Rc<RefCell<Vec<(f64, Vec2, Rect)>>>,
    pub errors: Rc<RefCell<Vec<GraphError>>>,
}

impl CallbackTracker {
    /// Register on every callback of `ctrl`.
    pub fn attach(ctrl: &GraphViewController) -> Self {
        let tracker = Self::default();
        let selected = tracker.selected.clone();
        ctrl.on_select(move |id, _, path| selected.borrow_mut().push((id.to_string(), path.to_vec())));
        let viewport = tracker.viewport.clone();
        ctrl.on_viewport_change(move |scale, offset, rect| {
            viewport.borrow_mut().push((scale, offset, rect))
        });
        let errors = tracker.errors.clone();
        ctrl.on_error(move |err| errors.borrow_mut().push(err.clone()));
        tracker
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.selected.borrow_mut().clear();
        self.viewport.borrow_mut().clear();
        self.errors.borrow_mut().clear();
    }
}

/// A controller on a 1000x1000 screen with `graph` loaded, plus a matching
/// recording canvas.
pub fn loaded(graph: Graph) -> (GraphViewController, RecordingCanvas) {
    let ctrl = GraphViewController::default();
    ctrl.resize(SCREEN);
    if let Err(err) = ctrl.load_graph(graph) {
        panic!("fixture graph failed to load: {}", err);
    }
    (ctrl, RecordingCanvas::new(SCREEN))
}
