//! High-level controller for the argument graph view.
//!
//! The [`GraphViewController`] owns the whole view: graph, layout,
//! transform, culler, routed edges, selection and thumbnails. Hosts feed it
//! pointer events and drive it with one [`frame`](GraphViewController::frame)
//! call per animation tick.
//!
//! # Example
//!
//! ```ignore
//! use dialectic_canvas::{GraphViewController, GraphViewConfig, ViewEvent};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = GraphViewController::new(GraphViewConfig::default());
//!
//!     // Pointer input is queued and applied on the next frame
//!     window.on_pointer_down(ctrl.pointer_down_callback());
//!     window.on_pointer_move(ctrl.pointer_move_callback());
//!     window.on_pointer_up(ctrl.pointer_up_callback());
//!     window.on_scroll(ctrl.wheel_callback());
//!
//!     ctrl.on_select(|id, node, path| {
//!         println!("{} ({}) via {:?}", id, node.summary, path);
//!     });
//!
//!     ctrl.load_json(&std::fs::read_to_string("debate.json").unwrap()).unwrap();
//!
//!     // In the animation timer
//!     let stats = ctrl.frame(now_ms(), &mut canvas);
//!     window.set_status(stats.summary().into());
//! }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slint::{SharedString, VecModel};

use crate::config::GraphViewConfig;
use crate::cull::ViewportCuller;
use crate::error::GraphError;
use crate::geometry::{Rect, Size, Vec2};
use crate::graph::{ArgumentNode, Graph, GraphIndex, NodeType};
use crate::hit_test::find_node_at;
use crate::layout::{layout_with_index, Layout};
use crate::links::EdgeManager;
use crate::render::{Canvas, RenderStats, Renderer, RenderStyle, Scene};
use crate::selection::SelectionManager;
use crate::state::{CoordinateSystem, Transform};
use crate::thumbnails::{ImageHandle, ThumbnailCache, ThumbnailRequest};

/// Input accepted by the controller. Positions are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    /// Wheel delta in pixels; negative zooms in.
    Wheel { position: Vec2, delta: f64 },
    Resize(Size),
    ZoomIn,
    ZoomOut,
    Reset,
    ZoomToFit,
}

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging {
        /// `pointer - offset` at press time.
        drag_start: Vec2,
        press: Vec2,
        last: Vec2,
        /// Whether the pointer left the click slop.
        moved: bool,
    },
    /// A wheel gesture is being applied. Ends with the event batch.
    Zooming,
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

enum Notification {
    Selected {
        id: String,
        node: ArgumentNode,
        path: Vec<String>,
    },
    ViewportChanged {
        scale: f64,
        offset: Vec2,
        viewport: Rect,
    },
    Error(GraphError),
}

type SelectCallback = Rc<dyn Fn(&str, &ArgumentNode, &[String])>;
type ViewportCallback = Rc<dyn Fn(f64, Vec2, Rect)>;
type ErrorCallback = Rc<dyn Fn(&GraphError)>;

#[derive(Default)]
struct Callbacks {
    on_select: Option<SelectCallback>,
    on_viewport_change: Option<ViewportCallback>,
    on_error: Option<ErrorCallback>,
}

struct ViewState {
    config: GraphViewConfig,
    graph: Graph,
    index: GraphIndex,
    layout: Layout,
    coords: CoordinateSystem,
    culler: ViewportCuller,
    edges: EdgeManager,
    selection: SelectionManager,
    thumbnails: ThumbnailCache,
    renderer: Renderer,
    screen: Size,
    interaction: InteractionState,
    queue: VecDeque<ViewEvent>,
    /// Frame time at which the deferred post-gesture refresh runs.
    refresh_due: Option<u64>,
    /// Zoom-to-fit waits for a non-empty screen.
    fit_pending: bool,
    failure: Option<GraphError>,
    thumbnail_requests: Vec<ThumbnailRequest>,
    active_path_model: Option<Rc<VecModel<SharedString>>>,
    stats: RenderStats,
    notifications: Vec<Notification>,
}

impl ViewState {
    fn new(config: GraphViewConfig) -> Self {
        let mut coords = CoordinateSystem::new(config.min_scale, config.max_scale);
        coords.set_transform(config.initial_scale, Vec2::ZERO);
        let renderer = Renderer::new(RenderStyle {
            node_size: config.node_size,
            ..RenderStyle::default()
        });
        Self {
            culler: ViewportCuller::new(config.culling()),
            edges: EdgeManager::new(config.manhattan_tree_edges),
            graph: Graph::new(),
            index: GraphIndex::default(),
            layout: Layout::default(),
            coords,
            selection: SelectionManager::new(),
            thumbnails: ThumbnailCache::default(),
            renderer,
            screen: Size::default(),
            interaction: InteractionState::Idle,
            queue: VecDeque::new(),
            refresh_due: None,
            fit_pending: false,
            failure: None,
            thumbnail_requests: Vec::new(),
            active_path_model: None,
            stats: RenderStats::default(),
            notifications: Vec::new(),
            config,
        }
    }

    fn screen_center(&self) -> Vec2 {
        Vec2::new(self.screen.width / 2.0, self.screen.height / 2.0)
    }

    fn has_screen(&self) -> bool {
        self.screen.width > 0.0 && self.screen.height > 0.0
    }

    // === Graph lifecycle ===

    fn load(&mut self, graph: Graph) -> Result<(), GraphError> {
        let index = GraphIndex::build(&graph);
        let layout = match layout_with_index(&graph, &index, &self.config.layout()) {
            Ok(layout) => layout,
            Err(err) => {
                log::error!("Cannot lay out graph: {}", err);
                self.enter_safe_state(err.clone());
                return Err(err);
            }
        };
        log::debug!(
            "Loaded graph: {} nodes, {} dangling references",
            graph.len(),
            index.dangling().len()
        );

        self.reset_view_data();
        self.edges.set_graph(&graph, &index);
        self.graph = graph;
        self.index = index;
        self.layout = layout;

        if let Some(question) = self.graph.question_node().map(|n| n.id.clone()) {
            // Selected without notifying; question nodes are never drawn.
            if let Err(err) = self.selection.select(&self.graph, &self.index, &question) {
                log::warn!("Cannot select question node {}: {}", question, err);
            }
            self.sync_active_path();
        }

        if self.has_screen() {
            self.zoom_to_fit();
            self.notify_viewport();
        } else {
            self.fit_pending = true;
        }
        Ok(())
    }

    fn reset_view_data(&mut self) {
        self.graph = Graph::new();
        self.index = GraphIndex::default();
        self.layout = Layout::default();
        self.edges.clear();
        self.selection.clear();
        self.thumbnails.clear();
        self.thumbnail_requests.clear();
        self.coords.clear_bounds();
        self.culler.invalidate();
        self.interaction = InteractionState::Idle;
        self.refresh_due = None;
        self.fit_pending = false;
        self.failure = None;
        self.sync_active_path();
    }

    /// Drop everything and render a blank stage until the next load.
    fn enter_safe_state(&mut self, err: GraphError) {
        self.reset_view_data();
        self.failure = Some(err.clone());
        self.notifications.push(Notification::Error(err));
    }

    // === Selection ===

    fn select(&mut self, id: &str) -> Result<bool, GraphError> {
        let changed = self.selection.select(&self.graph, &self.index, id)?;
        if changed {
            self.edges.mark_dirty();
            self.sync_active_path();
            if let Some(node) = self.graph.get(id) {
                self.notifications.push(Notification::Selected {
                    id: id.to_string(),
                    node: node.clone(),
                    path: self.selection.active_path().to_vec(),
                });
            }
        }
        Ok(changed)
    }

    fn sync_active_path(&self) {
        if let Some(model) = &self.active_path_model {
            self.selection.sync_to_model(model);
        }
    }

    /// Node under a screen position, among the registered bounds.
    fn node_at(&self, screen: Vec2) -> Option<String> {
        let point = self.coords.to_logical(screen);
        find_node_at(point, self.coords.all_bounds()).map(str::to_string)
    }

    // === Viewport ===

    fn reset_view(&mut self) {
        let center = self.screen_center();
        self.coords.set_transform(self.config.initial_scale, center);
    }

    fn zoom_to_fit(&mut self) {
        if self.layout.is_empty() {
            self.reset_view();
            return;
        }
        let bbox = self.layout.bounds;
        let padding = self.config.fit_padding;
        let fit = (self.screen.width / (bbox.width + padding))
            .min(self.screen.height / (bbox.height + padding))
            .min(1.0)
            * self.config.fit_margin;
        let scale = self.coords.clamp_scale(fit);
        let offset = self.screen_center() - bbox.center() * scale;
        self.coords.set_transform(scale, offset);
        self.fit_pending = false;
    }

    fn zoom_by_step(&mut self, step: f64) {
        let scale = self.coords.scale() + step;
        let center = self.screen_center();
        self.coords.zoom_at(center, scale);
    }

    fn resize(&mut self, screen: Size) {
        if screen == self.screen {
            return;
        }
        self.screen = screen;
        if self.fit_pending && self.has_screen() {
            self.zoom_to_fit();
            self.notify_viewport();
        }
    }

    fn schedule_refresh(&mut self, now_ms: u64) {
        self.refresh_due = Some(now_ms + self.config.refresh_delay_ms);
    }

    fn notify_viewport(&mut self) {
        let t = self.coords.transform();
        self.notifications.push(Notification::ViewportChanged {
            scale: t.scale,
            offset: t.offset,
            viewport: t.logical_viewport(self.screen),
        });
    }

    // === Events ===

    fn apply(&mut self, event: ViewEvent, now_ms: u64) {
        match event {
            ViewEvent::PointerDown(p) => {
                let canvas = Rect::new(0.0, 0.0, self.screen.width, self.screen.height);
                if !self.interaction.is_dragging() && canvas.contains_point(p) {
                    self.interaction = InteractionState::Dragging {
                        drag_start: p - self.coords.offset(),
                        press: p,
                        last: p,
                        moved: false,
                    };
                }
            }
            ViewEvent::PointerMove(p) => self.drag_to(p),
            ViewEvent::PointerUp(p) => {
                self.drag_to(p);
                if let InteractionState::Dragging { moved, .. } = self.interaction {
                    self.interaction = InteractionState::Idle;
                    if moved {
                        self.schedule_refresh(now_ms);
                    } else if let Some(id) = self.node_at(p) {
                        if let Err(err) = self.select(&id) {
                            log::warn!("Click selection failed: {}", err);
                        }
                    }
                }
            }
            ViewEvent::Wheel { position, delta } => {
                let scale = self.coords.scale() * (1.0 - delta * self.config.zoom_speed);
                self.coords.zoom_at(position, scale);
                match &mut self.interaction {
                    InteractionState::Dragging {
                        drag_start, last, ..
                    } => *drag_start = *last - self.coords.offset(),
                    other => *other = InteractionState::Zooming,
                }
            }
            ViewEvent::Resize(size) => self.resize(size),
            ViewEvent::ZoomIn => {
                self.zoom_by_step(self.config.zoom_step);
                self.schedule_refresh(now_ms);
            }
            ViewEvent::ZoomOut => {
                self.zoom_by_step(-self.config.zoom_step);
                self.schedule_refresh(now_ms);
            }
            ViewEvent::Reset => {
                self.reset_view();
                self.schedule_refresh(now_ms);
            }
            ViewEvent::ZoomToFit => {
                self.zoom_to_fit();
                self.schedule_refresh(now_ms);
            }
        }
    }

    fn drag_to(&mut self, p: Vec2) {
        let slop = self.config.click_slop;
        let InteractionState::Dragging {
            drag_start,
            press,
            last,
            moved,
        } = &mut self.interaction
        else {
            return;
        };
        *last = p;
        if !*moved && (p - *press).length() > slop {
            *moved = true;
        }
        if *moved {
            let offset = p - *drag_start;
            self.coords.set_offset(offset);
        }
    }

    /// Apply every queued event, then finish a wheel gesture.
    fn process_events(&mut self, now_ms: u64) {
        // Events queued while processing wait for the next frame.
        let batch: Vec<ViewEvent> = self.queue.drain(..).collect();
        for event in batch {
            self.apply(event, now_ms);
        }
        if self.interaction == InteractionState::Zooming {
            self.interaction = InteractionState::Idle;
            self.schedule_refresh(now_ms);
        }
    }

    fn run_deferred(&mut self, now_ms: u64) {
        if self.interaction.is_dragging() {
            return;
        }
        if let Some(due) = self.refresh_due {
            if now_ms >= due {
                self.refresh_due = None;
                self.edges.mark_dirty();
                self.notify_viewport();
            }
        }
    }

    // === Frame ===

    fn frame(&mut self, now_ms: u64, canvas: &mut dyn Canvas) -> RenderStats {
        self.resize(canvas.size());
        self.process_events(now_ms);
        self.run_deferred(now_ms);

        if self.failure.is_some() {
            self.stats = self.renderer.draw_empty(canvas);
            return self.stats;
        }

        let ViewState {
            graph,
            layout,
            coords,
            culler,
            edges,
            selection,
            thumbnails,
            renderer,
            screen,
            interaction,
            thumbnail_requests,
            ..
        } = &mut *self;

        // Edges follow the canvas transform while dragging.
        if edges.is_dirty() && !interaction.is_dragging() {
            edges.recompute(&layout.positions, coords, selection);
        }

        let transform = coords.transform();
        let visible = culler.cull(&transform, *screen, &layout.positions, edges.edges());

        let drawable = visible.nodes.iter().copied().filter(|id| {
            graph
                .get(id)
                .is_some_and(|n| n.node_type != NodeType::Question)
        });
        thumbnail_requests.extend(thumbnails.request_visible(drawable));

        let scene = Scene {
            graph,
            positions: &layout.positions,
            edges,
            selection,
            thumbnails,
            transform,
        };
        let stats = renderer.draw_frame(canvas, &scene, &visible, coords);
        self.stats = stats;
        stats
    }
}

/// Controller that owns the graph view and provides callback implementations.
///
/// This handles:
/// - Layout on load, with a blank safe state when the graph is malformed
/// - Pan, wheel zoom, zoom buttons, reset and zoom-to-fit
/// - Click selection and the active path
/// - Viewport culling and deferred edge recomputation
/// - Thumbnail request bookkeeping
///
/// Callbacks registered with [`on_select`](Self::on_select),
/// [`on_viewport_change`](Self::on_viewport_change) and
/// [`on_error`](Self::on_error) run after the controller's internal borrow is
/// released, so they may call back into the controller.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct GraphViewController {
    state: Rc<RefCell<ViewState>>,
    callbacks: Rc<RefCell<Callbacks>>,
}

impl Default for GraphViewController {
    fn default() -> Self {
        Self::new(GraphViewConfig::default())
    }
}

impl GraphViewController {
    /// Create a controller. The view starts empty.
    ///
    /// A config that fails [`GraphViewConfig::validate`] is replaced by the
    /// defaults.
    pub fn new(config: GraphViewConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Ignoring invalid view config: {}", err);
                GraphViewConfig::default()
            }
        };
        Self {
            state: Rc::new(RefCell::new(ViewState::new(config))),
            callbacks: Rc::new(RefCell::new(Callbacks::default())),
        }
    }

    pub fn config(&self) -> GraphViewConfig {
        self.state.borrow().config.clone()
    }

    // === Graph ===

    /// Lay out and show `graph`, replacing the current one.
    ///
    /// A malformed graph puts the view into a blank safe state and fires
    /// `on_error` once; the error is also returned.
    pub fn load_graph(&self, graph: Graph) -> Result<(), GraphError> {
        let result = self.state.borrow_mut().load(graph);
        self.dispatch();
        result
    }

    /// Decode a JSON id → node map and load it.
    pub fn load_json(&self, json: &str) -> Result<(), GraphError> {
        let graph = Graph::from_json(json)?;
        self.load_graph(graph)
    }

    /// The error that put the view into its safe state, if any.
    pub fn failure(&self) -> Option<GraphError> {
        self.state.borrow().failure.clone()
    }

    pub fn node_count(&self) -> usize {
        self.state.borrow().graph.len()
    }

    pub fn node(&self, id: &str) -> Option<ArgumentNode> {
        self.state.borrow().graph.get(id).cloned()
    }

    /// Logical layout position of a node.
    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.state.borrow().layout.get(id)
    }

    /// Bounding box of all node centers.
    pub fn layout_bounds(&self) -> Rect {
        self.state.borrow().layout.bounds
    }

    pub fn layout(&self) -> Layout {
        self.state.borrow().layout.clone()
    }

    // === Callbacks ===

    /// Called with `(id, node, active_path)` after each selection change.
    pub fn on_select(&self, f: impl Fn(&str, &ArgumentNode, &[String]) + 'static) {
        self.callbacks.borrow_mut().on_select = Some(Rc::new(f));
    }

    /// Called with `(scale, offset, logical viewport)` after each settled
    /// transform change.
    pub fn on_viewport_change(&self, f: impl Fn(f64, Vec2, Rect) + 'static) {
        self.callbacks.borrow_mut().on_viewport_change = Some(Rc::new(f));
    }

    /// Called once per failed load.
    pub fn on_error(&self, f: impl Fn(&GraphError) + 'static) {
        self.callbacks.borrow_mut().on_error = Some(Rc::new(f));
    }

    fn dispatch(&self) {
        let pending = std::mem::take(&mut self.state.borrow_mut().notifications);
        for notification in pending {
            match notification {
                Notification::Selected { id, node, path } => {
                    let cb = self.callbacks.borrow().on_select.clone();
                    if let Some(cb) = cb {
                        cb(&id, &node, &path);
                    }
                }
                Notification::ViewportChanged {
                    scale,
                    offset,
                    viewport,
                } => {
                    let cb = self.callbacks.borrow().on_viewport_change.clone();
                    if let Some(cb) = cb {
                        cb(scale, offset, viewport);
                    }
                }
                Notification::Error(err) => {
                    let cb = self.callbacks.borrow().on_error.clone();
                    if let Some(cb) = cb {
                        cb(&err);
                    }
                }
            }
        }
    }

    // === Callback factories ===

    /// Returns a callback for a Slint `pointer-down(x, y)`.
    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32) {
        let state = self.state.clone();
        move |x, y| {
            let p = Vec2::new(x as f64, y as f64);
            state.borrow_mut().queue.push_back(ViewEvent::PointerDown(p));
        }
    }

    /// Returns a callback for a Slint `pointer-move(x, y)`.
    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let state = self.state.clone();
        move |x, y| {
            let p = Vec2::new(x as f64, y as f64);
            state.borrow_mut().queue.push_back(ViewEvent::PointerMove(p));
        }
    }

    /// Returns a callback for a Slint `pointer-up(x, y)`.
    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32) {
        let state = self.state.clone();
        move |x, y| {
            let p = Vec2::new(x as f64, y as f64);
            state.borrow_mut().queue.push_back(ViewEvent::PointerUp(p));
        }
    }

    /// Returns a callback for a Slint `scroll(x, y, delta)`.
    pub fn wheel_callback(&self) -> impl Fn(f32, f32, f32) {
        let state = self.state.clone();
        move |x, y, delta| {
            state.borrow_mut().queue.push_back(ViewEvent::Wheel {
                position: Vec2::new(x as f64, y as f64),
                delta: delta as f64,
            });
        }
    }

    /// Returns a callback for `node-rect-changed(id, x, y, w, h)`.
    pub fn node_rect_changed_callback(&self) -> impl Fn(SharedString, f32, f32, f32, f32) {
        let ctrl = self.clone();
        move |id, x, y, w, h| {
            ctrl.handle_node_rect(&id, x as f64, y as f64, w as f64, h as f64);
        }
    }

    // === Direct handlers ===

    /// Queue an event for the next frame.
    pub fn push_event(&self, event: ViewEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Handle a node rect reported by the host in screen coordinates.
    ///
    /// The rect is converted to logical space before it is registered, so
    /// it stays valid across pan and zoom.
    pub fn handle_node_rect(&self, id: &str, x: f64, y: f64, w: f64, h: f64) {
        let mut state = self.state.borrow_mut();
        if !state.graph.contains(id) {
            log::debug!("Ignoring rect for unknown node {}", id);
            return;
        }
        state.coords.handle_node_rect_report(id, Rect::new(x, y, w, h));
        state.edges.mark_dirty();
    }

    /// Select a node programmatically. Fires `on_select` when the selection
    /// changes.
    pub fn select(&self, id: &str) -> Result<bool, GraphError> {
        let result = self.state.borrow_mut().select(id);
        self.dispatch();
        result
    }

    pub fn clear_selection(&self) {
        let mut state = self.state.borrow_mut();
        state.selection.clear();
        state.edges.mark_dirty();
        state.sync_active_path();
    }

    pub fn selected(&self) -> Option<String> {
        self.state.borrow().selection.selected().map(str::to_string)
    }

    pub fn active_path(&self) -> Vec<String> {
        self.state.borrow().selection.active_path().to_vec()
    }

    /// Id of the drawn node under a screen position.
    pub fn node_at(&self, screen: Vec2) -> Option<String> {
        self.state.borrow().node_at(screen)
    }

    /// Key of the routed edge under a screen position, within `tolerance`
    /// screen pixels.
    pub fn edge_at(&self, screen: Vec2, tolerance: f64) -> Option<String> {
        let state = self.state.borrow();
        let point = state.coords.to_logical(screen);
        let tolerance = tolerance / state.coords.scale();
        state.edges.find_at(point, tolerance).map(str::to_string)
    }

    // === Viewport ===

    pub fn transform(&self) -> Transform {
        self.state.borrow().coords.transform()
    }

    pub fn scale(&self) -> f64 {
        self.state.borrow().coords.scale()
    }

    /// Set the transform directly (scale is clamped).
    pub fn set_transform(&self, scale: f64, offset: Vec2) {
        self.state.borrow_mut().coords.set_transform(scale, offset);
    }

    pub fn to_screen(&self, logical: Vec2) -> Vec2 {
        self.state.borrow().coords.to_screen(logical)
    }

    pub fn to_logical(&self, screen: Vec2) -> Vec2 {
        self.state.borrow().coords.to_logical(screen)
    }

    pub fn screen_size(&self) -> Size {
        self.state.borrow().screen
    }

    /// Resize the drawing surface immediately.
    pub fn resize(&self, screen: Size) {
        self.state.borrow_mut().resize(screen);
        self.dispatch();
    }

    pub fn interaction(&self) -> InteractionState {
        self.state.borrow().interaction
    }

    /// Frame time of the pending post-gesture refresh, if any.
    pub fn refresh_due(&self) -> Option<u64> {
        self.state.borrow().refresh_due
    }

    // === Frame loop ===

    /// Run one frame at `now_ms`: apply queued events, run due deferred
    /// work, cull, recompute edges if needed and draw.
    pub fn frame(&self, now_ms: u64, canvas: &mut dyn Canvas) -> RenderStats {
        let stats = self.state.borrow_mut().frame(now_ms, canvas);
        self.dispatch();
        stats
    }

    /// Counts from the last frame.
    pub fn stats(&self) -> RenderStats {
        self.state.borrow().stats
    }

    pub fn edge_recompute_count(&self) -> usize {
        self.state.borrow().edges.recompute_count()
    }

    pub fn cull_refresh_count(&self) -> usize {
        self.state.borrow().culler.refresh_count()
    }

    pub fn cached_viewport(&self) -> Option<Rect> {
        self.state.borrow().culler.cached_viewport()
    }

    // === Thumbnails ===

    /// Thumbnail fetches the host should start, accumulated over frames.
    pub fn take_thumbnail_requests(&self) -> Vec<ThumbnailRequest> {
        std::mem::take(&mut self.state.borrow_mut().thumbnail_requests)
    }

    /// Report a finished fetch. Returns whether the node will be redrawn.
    pub fn complete_thumbnail(&self, node_id: &str, result: Result<ImageHandle, GraphError>) -> bool {
        let mut state = self.state.borrow_mut();
        let ViewState {
            graph, thumbnails, ..
        } = &mut *state;
        thumbnails.complete(graph, node_id, result)
    }

    pub fn set_default_thumbnail(&self, image: Option<ImageHandle>) {
        self.state.borrow_mut().thumbnails.set_default_image(image);
    }

    // === Slint models ===

    /// Mirror screen-space edge paths into a Slint model on every recompute.
    pub fn bind_edge_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString, slint::Color, f32) -> P + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.edges.bind_model(model, constructor);
        state.edges.mark_dirty();
    }

    /// Mirror the active path into a Slint model.
    pub fn bind_active_path_model(&self, model: Rc<VecModel<SharedString>>) {
        let mut state = self.state.borrow_mut();
        state.active_path_model = Some(model);
        state.sync_active_path();
    }
}
