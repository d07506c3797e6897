//! Per-node thumbnail bookkeeping.
//!
//! The crate never fetches anything. It hands the host a list of node ids
//! whose thumbnails should be loaded, and the host reports back with
//! [`ThumbnailCache::complete`] whenever a fetch finishes. Nodes render
//! without an image until then.

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::graph::Graph;

/// Opaque reference to a host-side image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailState {
    /// Handed to the host, not completed yet.
    Requested,
    Ready(ImageHandle),
    /// The fetch failed; the default thumbnail is used.
    Failed,
}

/// A fetch the host should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub node_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    states: HashMap<String, ThumbnailState>,
    default_image: Option<ImageHandle>,
}

impl ThumbnailCache {
    pub fn new(default_image: Option<ImageHandle>) -> Self {
        Self {
            states: HashMap::new(),
            default_image,
        }
    }

    pub fn set_default_image(&mut self, image: Option<ImageHandle>) {
        self.default_image = image;
    }

    /// New requests for `visible` nodes that have no state yet.
    ///
    /// Requests still in flight for nodes that are no longer visible are
    /// abandoned; their late completions are ignored.
    pub fn request_visible<'a, I>(&mut self, visible: I) -> Vec<ThumbnailRequest>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: HashSet<&str> = visible.into_iter().collect();
        let before = self.states.len();
        self.states
            .retain(|id, state| *state != ThumbnailState::Requested || visible.contains(id.as_str()));
        let abandoned = before - self.states.len();
        if abandoned > 0 {
            log::debug!("Abandoned {} thumbnail requests for hidden nodes", abandoned);
        }

        let mut fresh: Vec<&str> = visible
            .into_iter()
            .filter(|id| !self.states.contains_key(*id))
            .collect();
        fresh.sort_unstable();
        fresh
            .into_iter()
            .map(|id| {
                self.states.insert(id.to_string(), ThumbnailState::Requested);
                ThumbnailRequest {
                    node_id: id.to_string(),
                }
            })
            .collect()
    }

    /// Record the outcome of a fetch. Returns true when the node should be
    /// redrawn.
    ///
    /// Completions for nodes that left the graph, or whose request was
    /// abandoned, are dropped silently.
    pub fn complete(
        &mut self,
        graph: &Graph,
        node_id: &str,
        result: Result<ImageHandle, GraphError>,
    ) -> bool {
        if !graph.contains(node_id) {
            self.states.remove(node_id);
            return false;
        }
        if self.states.get(node_id) != Some(&ThumbnailState::Requested) {
            return false;
        }
        let state = match result {
            Ok(handle) => ThumbnailState::Ready(handle),
            Err(err) => {
                log::debug!("{}", err);
                ThumbnailState::Failed
            }
        };
        self.states.insert(node_id.to_string(), state);
        true
    }

    pub fn state(&self, node_id: &str) -> Option<ThumbnailState> {
        self.states.get(node_id).copied()
    }

    /// The image to draw for a node, if any.
    pub fn image_for(&self, node_id: &str) -> Option<ImageHandle> {
        match self.states.get(node_id)? {
            ThumbnailState::Ready(handle) => Some(*handle),
            ThumbnailState::Failed => self.default_image,
            ThumbnailState::Requested => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == ThumbnailState::Requested)
            .count()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
