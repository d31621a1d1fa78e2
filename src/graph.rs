//! Node/edge model plus the edge bookkeeping every strategy shares.
//!
//! Edges are kept in a plain `Vec<Edge>`; for any unordered pair of nodes at
//! most one edge may exist, so every insertion goes through [`find_edge`]
//! first. [`add_or_accumulate`] bundles that find-then-branch.

use log::warn;
use serde::{Deserialize, Serialize};

/// Decay rate applied by [`normalize_weights`].
pub const DECAY: f64 = 2.0;

/// What kind of entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Artist,
    Song,
}

/// Purely visual hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Dot,
    Diamond,
}

impl From<NodeGroup> for NodeShape {
    fn from(group: NodeGroup) -> Self {
        match group {
            NodeGroup::Song => Self::Dot,
            NodeGroup::Artist => Self::Diamond,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Dense index, equal to the node's position in [`Graph::nodes`].
    pub id: usize,
    /// Id of the track or artist this node was built from.
    pub guid: String,
    pub label: String,
    pub group: NodeGroup,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub value: f64,
}

impl Edge {
    /// True if this edge joins `a` and `b`, in either direction.
    #[must_use]
    pub const fn joins(&self, a: usize, b: usize) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// A finished graph, handed to the caller as an immutable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    #[must_use]
    pub fn node_by_guid(&self, guid: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.guid == guid)
    }
}

/// How [`find_edge`] compares endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMatch {
    /// Only an exact `(from, to)` match counts.
    Directed,
    /// `(from, to)` and `(to, from)` are the same edge.
    Undirected,
}

/// Index of the edge between `from` and `to`, if there is one.
#[must_use]
pub fn find_edge(from: usize, to: usize, edges: &[Edge], mode: EdgeMatch) -> Option<usize> {
    edges.iter().position(|edge| match mode {
        EdgeMatch::Directed => edge.from == from && edge.to == to,
        EdgeMatch::Undirected => edge.joins(from, to),
    })
}

/// Appends a new edge without checking for an existing one.
///
/// Callers must have ruled out an existing edge with [`find_edge`]. Self-loops
/// are refused.
pub fn push_edge(edges: &mut Vec<Edge>, from: usize, to: usize, weight: f64) {
    if from == to {
        warn!("Refusing to create self-loop on node {from}");
        return;
    }
    edges.push(Edge { from, to, value: weight });
}

/// Adds `weight` onto the existing edge between `from` and `to`, or creates
/// one carrying `weight`.
pub fn add_or_accumulate(edges: &mut Vec<Edge>, from: usize, to: usize, weight: f64, mode: EdgeMatch) {
    match find_edge(from, to, edges, mode) {
        Some(index) => edges[index].value += weight,
        None => push_edge(edges, from, to, weight),
    }
}

/// Turns raw distances into weights in `(0, 1]` via `exp(-decay * value)`.
///
/// Smaller distances give heavier edges.
pub fn normalize_weights(edges: &mut [Edge], decay: f64) {
    for edge in edges {
        edge.value = (-decay * edge.value).exp();
    }
}

/// Per-build accumulator. Nodes are added first, edges after, then the
/// builder is consumed into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Concatenates an edge set produced by one strategy. Edge sets from
    /// different strategies are never merged with each other.
    pub fn extend_edges(&mut self, edges: Vec<Edge>) {
        self.edges.extend(edges);
    }

    #[must_use]
    pub fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}
