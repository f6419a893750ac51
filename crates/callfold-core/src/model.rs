//! Core data structures for the call graph

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier issued by [`crate::Graph`] when a node is inserted.
///
/// Ids are handed out in increasing order and never reused within one graph,
/// so sorting by id recovers insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Syntactic construct a node was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // ── Declarations ────────────────────────────────────────
    Function,
    Method,
    AssociatedFunction,

    // ── Call expressions ────────────────────────────────────
    Call,
    MethodCall,

    // ── Containers ──────────────────────────────────────────
    File,
    Module,
    Impl,
    Trait,

    // ── Fallback ────────────────────────────────────────────
    Unknown,
}

/// Location of a node in the build input.
///
/// `file` is the index of the file inside the build request, so ordering by
/// position follows the order in which files were concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: u32,
    pub byte: u32,
    pub line: u32,
}

impl SourcePosition {
    pub fn new(file: u32, byte: u32, line: u32) -> Self {
        SourcePosition { file, byte, line }
    }
}

/// A single node in the call graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    /// Overwritten by the graph on insertion.
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Argument labels for a call site, parameter first-names for a
    /// declaration. Unlabeled positions are empty strings.
    pub labels: Vec<String>,
    /// Human-readable label used when rendering.
    pub description: String,
    pub position: Option<SourcePosition>,
}

impl GraphNode {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        let name = name.into();
        GraphNode {
            id: NodeId::default(),
            kind,
            description: name.clone(),
            name,
            labels: Vec::new(),
            position: None,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn at(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }
}

/// A directed edge, from use-site to used-site.
///
/// Edges carry no identity beyond their endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Edge { source, target }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
