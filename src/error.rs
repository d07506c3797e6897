use std::fmt;

/// Which node field held a reference that did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceField {
    ParentId,
    IdenticalTo,
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentId => write!(f, "parent_id"),
            Self::IdenticalTo => write!(f, "identical_to"),
        }
    }
}

/// Errors produced while indexing, laying out or viewing a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The graph cannot be laid out. `id` names the offending node.
    MalformedGraph { id: String, reason: String },
    /// A `parent_id` or `identical_to` points at an id that is not in the graph.
    DanglingReference {
        id: String,
        field: ReferenceField,
        target: String,
    },
    /// The requested node does not exist.
    NotFound(String),
    /// A thumbnail fetch for `id` failed.
    ResourceFetchFailed { id: String, reason: String },
    /// Graph or config input could not be decoded.
    InvalidInput(String),
}

impl GraphError {
    pub(crate) fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGraph {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// The node id this error refers to, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::MalformedGraph { id, .. }
            | Self::DanglingReference { id, .. }
            | Self::ResourceFetchFailed { id, .. } => Some(id),
            Self::NotFound(id) => Some(id),
            Self::InvalidInput(_) => None,
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedGraph { id, reason } => {
                write!(f, "Malformed graph at node {}: {}", id, reason)
            }
            Self::DanglingReference { id, field, target } => {
                write!(f, "Node {} has {} {} which does not exist", id, field, target)
            }
            Self::NotFound(id) => write!(f, "Node {} not found", id),
            Self::ResourceFetchFailed { id, reason } => {
                write!(f, "Failed to fetch image for node {}: {}", id, reason)
            }
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
