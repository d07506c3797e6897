//! Argument graph model and the adjacency index derived from it.
//!
//! A [`Graph`] is the raw id → node mapping handed over by the host. The
//! [`GraphIndex`] built from it answers the structural questions the rest of
//! the pipeline asks: children split by kind, parent lookup, identity links,
//! root(s) and ancestry.

use crate::error::{GraphError, ReferenceField};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Kind of argument a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Question,
    Thesis,
    Antithesis,
    Synthesis,
    Reason,
    #[default]
    Other,
}

impl NodeType {
    /// Parse a node type name. Matching is case-insensitive; anything
    /// unrecognised becomes [`NodeType::Other`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "question" => Self::Question,
            "thesis" => Self::Thesis,
            "antithesis" => Self::Antithesis,
            "synthesis" => Self::Synthesis,
            "reason" => Self::Reason,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Thesis => "thesis",
            Self::Antithesis => "antithesis",
            Self::Synthesis => "synthesis",
            Self::Reason => "reason",
            Self::Other => "other",
        }
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name: Option<String> = Option::deserialize(deserializer)?;
        Ok(name.map(|n| NodeType::parse(&n)).unwrap_or_default())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Node size multiplier for an average rating in `[0, 100]`.
///
/// 50 (and a missing or non-finite rating) maps to 1.0; the range is 0.25..=1.75.
pub fn rating_scale(average_rating: Option<f64>) -> f64 {
    let rating = average_rating
        .filter(|r| r.is_finite())
        .unwrap_or(50.0)
        .clamp(0.0, 100.0);
    1.0 + 0.75 * (rating - 50.0) / 50.0
}

/// One node of the argument graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArgumentNode {
    /// Filled in from the map key when decoding a [`Graph`].
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub identical_to: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nonsense: bool,
    #[serde(default, rename = "averageRating")]
    pub average_rating: Option<f64>,
}

impl ArgumentNode {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            ..Default::default()
        }
    }

    /// Builder-style parent assignment.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_identical_to(mut self, other: impl Into<String>) -> Self {
        self.identical_to = Some(other.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.average_rating = Some(rating);
        self
    }

    pub fn is_reason(&self) -> bool {
        self.node_type == NodeType::Reason
    }

    /// Size multiplier derived from the average rating, see [`rating_scale`].
    pub fn size_scale(&self) -> f64 {
        rating_scale(self.average_rating)
    }

    /// Nodes that end a line of argument.
    pub fn is_terminal(&self) -> bool {
        self.nonsense || self.identical_to.is_some()
    }

    // Empty strings are treated like null, matching how the document store
    // encodes a missing reference.
    fn normalize(&mut self) {
        if self.parent_id.as_deref().is_some_and(str::is_empty) {
            self.parent_id = None;
        }
        if self.identical_to.as_deref().is_some_and(str::is_empty) {
            self.identical_to = None;
        }
    }
}

/// Mapping id → node, iterated in ascending id order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, ArgumentNode>")]
pub struct Graph {
    nodes: BTreeMap<String, ArgumentNode>,
}

impl From<BTreeMap<String, ArgumentNode>> for Graph {
    fn from(nodes: BTreeMap<String, ArgumentNode>) -> Self {
        Graph::from_nodes(nodes.into_iter().map(|(id, mut node)| {
            node.id = id;
            node
        }))
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes; later duplicates of an id replace earlier ones.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = ArgumentNode>,
    {
        let mut graph = Graph::new();
        for node in nodes {
            graph.insert(node);
        }
        graph
    }

    /// Decode a JSON object mapping id → node.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, mut node: ArgumentNode) {
        node.normalize();
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get(&self, id: &str) -> Option<&ArgumentNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentNode)> + '_ {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.keys().map(String::as_str)
    }

    /// The first question node in id order, if any.
    pub fn question_node(&self) -> Option<&ArgumentNode> {
        self.nodes.values().find(|n| n.node_type == NodeType::Question)
    }
}

/// Kind of a derived edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// Parent → non-reason child.
    Tree,
    /// Parent → reason child, drawn upwards.
    Reason,
    /// Node → the node it is declared identical to.
    Identity,
}

/// A derived edge between two existing nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    /// Stable key, unique per graph.
    pub fn key(&self) -> String {
        let prefix = match self.kind {
            EdgeKind::Tree => "tree",
            EdgeKind::Reason => "reason",
            EdgeKind::Identity => "identity",
        };
        format!("{}:{}->{}", prefix, self.source, self.target)
    }
}

/// Adjacency index over a [`Graph`].
///
/// Building never fails. Unresolved references are dropped (and logged once),
/// and root ambiguity is recorded so layout can report it.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    root_id: Option<String>,
    extra_roots: Vec<String>,
    conflicting_roots: Vec<String>,
    parent_of: HashMap<String, String>,
    children_of: HashMap<String, Vec<String>>,
    reasons_of: HashMap<String, Vec<String>>,
    non_reason_children_of: HashMap<String, Vec<String>>,
    identity_out_of: HashMap<String, String>,
    dangling: Vec<GraphError>,
    node_count: usize,
}

impl GraphIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut index = GraphIndex {
            node_count: graph.len(),
            ..Default::default()
        };
        let mut reported: HashSet<(String, ReferenceField)> = HashSet::new();
        let mut null_parent_roots = Vec::new();

        // Graph iteration is ordered by id, so every child list below is sorted.
        for (id, node) in graph.iter() {
            match node.parent_id.as_deref() {
                None => null_parent_roots.push(id.to_string()),
                Some(parent) if graph.contains(parent) => {
                    index.parent_of.insert(id.to_string(), parent.to_string());
                    index
                        .children_of
                        .entry(parent.to_string())
                        .or_default()
                        .push(id.to_string());
                    let bucket = if node.is_reason() {
                        &mut index.reasons_of
                    } else {
                        &mut index.non_reason_children_of
                    };
                    bucket.entry(parent.to_string()).or_default().push(id.to_string());
                }
                Some(parent) => {
                    index.record_dangling(&mut reported, id, ReferenceField::ParentId, parent);
                    index.extra_roots.push(id.to_string());
                }
            }

            match node.identical_to.as_deref() {
                Some(other) if other == id => {
                    log::debug!("Ignoring self identity on node {}", id);
                }
                Some(other) if graph.contains(other) => {
                    index.identity_out_of.insert(id.to_string(), other.to_string());
                }
                Some(other) => {
                    index.record_dangling(&mut reported, id, ReferenceField::IdenticalTo, other);
                }
                None => {}
            }
        }

        match null_parent_roots.len() {
            0 => {
                // Only orphans (if any) remain; the first one stands in for the root.
                if !index.extra_roots.is_empty() {
                    index.root_id = Some(index.extra_roots.remove(0));
                }
            }
            1 => index.root_id = null_parent_roots.pop(),
            _ => {
                let questions: Vec<&String> = null_parent_roots
                    .iter()
                    .filter(|id| {
                        graph
                            .get(id)
                            .is_some_and(|n| n.node_type == NodeType::Question)
                    })
                    .collect();
                if questions.len() == 1 {
                    let root = questions[0].clone();
                    let mut others: Vec<String> =
                        null_parent_roots.into_iter().filter(|id| *id != root).collect();
                    log::warn!(
                        "Graph has {} extra parentless nodes; attaching them beside root {}",
                        others.len(),
                        root
                    );
                    others.append(&mut index.extra_roots);
                    others.sort();
                    index.extra_roots = others;
                    index.root_id = Some(root);
                } else {
                    index.root_id = null_parent_roots.first().cloned();
                    index.conflicting_roots = null_parent_roots;
                }
            }
        }

        index
    }

    fn record_dangling(
        &mut self,
        reported: &mut HashSet<(String, ReferenceField)>,
        id: &str,
        field: ReferenceField,
        target: &str,
    ) {
        if reported.insert((id.to_string(), field)) {
            log::warn!("Dropping {} reference {} -> {}: unknown id", field, id, target);
            self.dangling.push(GraphError::DanglingReference {
                id: id.to_string(),
                field,
                target: target.to_string(),
            });
        }
    }

    /// The root node id, if the graph has one.
    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    /// Nodes laid out beside the root because their parent is unknown
    /// (or because they were parentless next to a unique question root).
    pub fn extra_roots(&self) -> &[String] {
        &self.extra_roots
    }

    /// Roots for layout: the root first, then the extra roots in id order.
    ///
    /// Fails with `MalformedGraph` when several parentless nodes compete for
    /// the root, or when a non-empty graph has no root at all.
    pub fn layout_roots(&self) -> Result<Vec<&str>, GraphError> {
        if let Some(second) = self.conflicting_roots.get(1) {
            return Err(GraphError::malformed(
                second.clone(),
                format!("{} parentless nodes and no unique question", self.conflicting_roots.len()),
            ));
        }
        match self.root_id.as_deref() {
            Some(root) => {
                let mut roots = vec![root];
                roots.extend(self.extra_roots.iter().map(String::as_str));
                Ok(roots)
            }
            None if self.node_count == 0 => Ok(Vec::new()),
            None => Err(GraphError::malformed(
                self.parent_of.keys().min().cloned().unwrap_or_default(),
                "no root: every node has a parent",
            )),
        }
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent_of.get(id).map(String::as_str)
    }

    /// All children of `id`, ascending by id.
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reason children of `id`, ascending by id.
    pub fn reasons_of(&self, id: &str) -> &[String] {
        self.reasons_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-reason children of `id`, ascending by id.
    pub fn non_reason_children_of(&self, id: &str) -> &[String] {
        self.non_reason_children_of
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn identity_of(&self, id: &str) -> Option<&str> {
        self.identity_out_of.get(id).map(String::as_str)
    }

    /// Dangling references dropped while building, one per (node, field).
    pub fn dangling(&self) -> &[GraphError] {
        &self.dangling
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Ancestors of `id`, root first, ending at its parent.
    ///
    /// Walks `parent_id` iteratively. A parent cycle yields `MalformedGraph`.
    pub fn ancestors(&self, graph: &Graph, id: &str) -> Result<Vec<String>, GraphError> {
        if !graph.contains(id) {
            return Err(GraphError::NotFound(id.to_string()));
        }
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(parent) {
                return Err(GraphError::malformed(parent, "cycle in parent relation"));
            }
            chain.push(parent.to_string());
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Root-to-node path including `id` itself.
    pub fn path_to(&self, graph: &Graph, id: &str) -> Result<Vec<String>, GraphError> {
        let mut path = self.ancestors(graph, id)?;
        path.push(id.to_string());
        Ok(path)
    }

    /// Every derived edge: parent/child edges in child-id order, then
    /// identity edges in source-id order.
    pub fn edges(&self, graph: &Graph) -> Vec<GraphEdge> {
        let mut edges = Vec::with_capacity(self.parent_of.len() + self.identity_out_of.len());
        for (id, node) in graph.iter() {
            if let Some(parent) = self.parent_of(id) {
                edges.push(GraphEdge {
                    kind: if node.is_reason() {
                        EdgeKind::Reason
                    } else {
                        EdgeKind::Tree
                    },
                    source: parent.to_string(),
                    target: id.to_string(),
                });
            }
        }
        for (id, _) in graph.iter() {
            if let Some(other) = self.identity_of(id) {
                edges.push(GraphEdge {
                    kind: EdgeKind::Identity,
                    source: id.to_string(),
                    target: other.to_string(),
                });
            }
        }
        edges
    }
}
