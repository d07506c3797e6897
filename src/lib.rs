//! # Dialectic Canvas
//!
//! Layout and viewport-culled canvas rendering for rooted argument graphs:
//! a question at the root, theses, antitheses and syntheses below it, and
//! reasons stacked above the node they support.
//!
//! ## Features
//!
//! - **Deterministic Layout** - Subtree-width tree layout with reason stacks,
//!   optional collision and spacing passes, normalized to the origin
//! - **Single Transform** - One scale + offset maps logical space to screen
//! - **Viewport Culling** - Padded, thrash-free culling with a cached viewport
//! - **Edge Routing** - Straight, quadratic, compound and Manhattan edges
//!   with per-kind styling and arrow heads
//! - **Host-Agnostic Drawing** - Everything goes through the [`Canvas`] trait
//!
//! ## Quick Start
//!
//! ```ignore
//! use dialectic_canvas::{GraphViewController, RecordingCanvas, Size};
//!
//! let ctrl = GraphViewController::default();
//! ctrl.resize(Size::new(1280.0, 800.0));
//! ctrl.load_json(json)?;
//!
//! let mut canvas = RecordingCanvas::new(Size::new(1280.0, 800.0));
//! let stats = ctrl.frame(0, &mut canvas);
//! println!("{}", stats.summary());
//! ```
//!
//! ## Rust Helpers
//!
//! - [`layout_graph`] - Lay out a graph without a controller
//! - [`route_edge`] - Route one edge between two logical points
//! - [`find_node_at`] / [`find_edge_at`] - Hit testing in logical space
//! - [`ViewportCuller`] - Visible node and edge sets for a transform
//! - [`EdgeManager`] / [`SelectionManager`] - Optional Slint model sync

pub mod geometry;
pub mod error;
pub mod config;
pub mod graph;
pub mod layout;
pub mod state;
pub mod path;
pub mod cull;
pub mod render;
pub mod thumbnails;
pub mod links;
pub mod selection;
pub mod controller;

pub use geometry::{Rect, Size, Vec2};
pub use error::{GraphError, ReferenceField};
pub use config::GraphViewConfig;
pub use graph::{rating_scale, ArgumentNode, EdgeKind, Graph, GraphEdge, GraphIndex, NodeType};
pub use layout::{
    compute_layout, expand_spacing, layout_graph, layout_with_index, normalize_layout,
    resolve_collisions, Layout, LayoutConfig, Positions,
};
pub use state::{CoordinateSystem, NodeBounds, Transform};
pub use path::{
    arrow_head, manhattan_points, route_edge, route_identity_edge, route_tree_edge, CubicBezier,
    EdgeGeometry, EdgeStyle, QuadraticBezier,
};
pub use cull::{CullConfig, ViewportCuller, VisibleSet};
pub use hit_test::{find_edge_at, find_node_at, nodes_in_rect, EdgeShape, NodeGeometry};
pub use render::{
    node_type_color, terminal_status, Canvas, DrawCommand, RecordingCanvas, RenderStats,
    RenderStyle, Renderer, Scene,
};
pub use thumbnails::{ImageHandle, ThumbnailCache, ThumbnailRequest, ThumbnailState};
pub use links::{EdgeManager, RoutedEdge};
pub use selection::SelectionManager;
pub use controller::{GraphViewController, InteractionState, ViewEvent};
