use std::collections::HashSet;

use slint::{Model, SharedString, VecModel};

use crate::error::GraphError;
use crate::graph::{Graph, GraphIndex};

/// Single selection plus the root-to-selection active path.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: Option<String>,
    active_path: Vec<String>,
    on_path: HashSet<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id` and recompute the active path.
    ///
    /// Returns whether the selection changed. Fails with `NotFound` for an
    /// unknown id, leaving the previous selection untouched.
    pub fn select(&mut self, graph: &Graph, index: &GraphIndex, id: &str) -> Result<bool, GraphError> {
        let path = index.path_to(graph, id)?;
        if self.selected.as_deref() == Some(id) && path == self.active_path {
            return Ok(false);
        }
        self.on_path = path.iter().cloned().collect();
        self.active_path = path;
        self.selected = Some(id.to_string());
        Ok(true)
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected = None;
        self.active_path.clear();
        self.on_path.clear();
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Ids from the root to the selected node, both included.
    pub fn active_path(&self) -> &[String] {
        &self.active_path
    }

    pub fn is_on_active_path(&self, id: &str) -> bool {
        self.on_path.contains(id)
    }

    /// An edge is highlighted when both of its ends are on the active path.
    pub fn is_edge_highlighted(&self, source: &str, target: &str) -> bool {
        self.on_path.contains(source) && self.on_path.contains(target)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// Sync the active path to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        for (i, id) in self.active_path.iter().enumerate() {
            let item = SharedString::from(id.as_str());
            if i < model.row_count() {
                model.set_row_data(i, item);
            } else {
                model.push(item);
            }
        }
        while model.row_count() > self.active_path.len() {
            model.remove(model.row_count() - 1);
        }
    }
}
