//! Graph wrapper using petgraph::StableDiGraph with set-semantics edges

use crate::error::{Error, Result};
use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};

/// The call graph: a directed graph where each `(u, v)` pair appears at most once.
///
/// Removing a node also removes every edge incident to it, so consumers never
/// observe an edge whose endpoint is gone.
pub struct Graph {
    inner: StableDiGraph<GraphNode, ()>,
    index: BTreeMap<NodeId, NodeIndex>,
    next_id: u64,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Add a node to the graph. Returns the id issued for it.
    pub fn add_node(&mut self, mut node: GraphNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        id
    }

    /// Insert the edge `source -> target`. Returns false if it was already present.
    pub fn add_directed_edge(&mut self, source: NodeId, target: NodeId) -> Result<bool> {
        let a = self.index_of(source)?;
        let b = self.index_of(target)?;
        if self.inner.contains_edge(a, b) {
            return Ok(false);
        }
        self.inner.add_edge(a, b, ());
        Ok(true)
    }

    /// Remove the edge `source -> target`. Returns false if there was no such edge.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(&source), self.index.get(&target)) else {
            return false;
        };
        match self.inner.find_edge(a, b) {
            Some(edge) => self.inner.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Remove a node together with all its incoming and outgoing edges.
    pub fn remove_node(&mut self, id: NodeId) -> Result<GraphNode> {
        let idx = self.index.remove(&id).ok_or(Error::NotFound(id))?;
        self.inner.remove_node(idx).ok_or(Error::NotFound(id))
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Result<&GraphNode> {
        let idx = self.index_of(id)?;
        self.inner.node_weight(idx).ok_or(Error::NotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn contains_edge(&self, source: NodeId, target: NodeId) -> bool {
        match (self.index.get(&source), self.index.get(&target)) {
            (Some(&a), Some(&b)) => self.inner.contains_edge(a, b),
            _ => false,
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.index.keys().copied().collect()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.index
            .values()
            .filter_map(move |&idx| self.inner.node_weight(idx))
    }

    /// All edges, sorted by `(source, target)`.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .inner
            .edge_indices()
            .filter_map(|e| self.inner.edge_endpoints(e))
            .map(|(a, b)| Edge::new(self.inner[a].id, self.inner[b].id))
            .collect();
        edges.sort();
        edges
    }

    /// Sources of all edges pointing at `id`, sorted.
    pub fn incoming(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Targets of all edges leaving `id`, sorted.
    pub fn outgoing(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes of this graph touched by at least one of the given edges.
    pub fn nodes_incident_to<'a, I>(&self, edges: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        edges
            .into_iter()
            .flat_map(|e| [e.source, e.target])
            .filter(|id| self.contains_node(*id))
            .collect()
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Result<Vec<NodeId>> {
        let idx = self.index_of(id)?;
        let mut ids: Vec<NodeId> = self
            .inner
            .neighbors_directed(idx, direction)
            .map(|n| self.inner[n].id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.index.get(&id).copied().ok_or(Error::NotFound(id))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
