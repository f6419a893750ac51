//! Post-collapse cleanup: self-loops and isolated nodes

use crate::error::Result;
use crate::graph::Graph;
use crate::model::{Edge, GraphNode, NodeId};
use std::collections::BTreeSet;

/// A cleaned graph ready for serialization.
///
/// Every edge connects two present nodes, no edge is a self-loop, every node
/// has at least one incident edge, and `highlighted` is a subset of the edges.
#[derive(Debug)]
pub struct CleanGraph {
    graph: Graph,
    highlighted: BTreeSet<Edge>,
}

impl CleanGraph {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.all_nodes()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    pub fn highlighted(&self) -> &BTreeSet<Edge> {
        &self.highlighted
    }

    /// Edges that were not produced by collapsing.
    pub fn plain_edges(&self) -> Vec<Edge> {
        self.graph
            .edges()
            .into_iter()
            .filter(|e| !self.highlighted.contains(e))
            .collect()
    }
}

/// Drop self-loops, then every node left without an incident edge.
pub fn clean(mut graph: Graph, highlighted: BTreeSet<Edge>) -> Result<CleanGraph> {
    let loops: Vec<Edge> = graph.edges().into_iter().filter(Edge::is_self_loop).collect();
    for edge in &loops {
        graph.remove_edge(edge.source, edge.target);
    }

    let connected = graph.nodes_incident_to(&graph.edges());
    let isolated: Vec<NodeId> = graph
        .node_ids()
        .into_iter()
        .filter(|id| !connected.contains(id))
        .collect();
    for id in &isolated {
        graph.remove_node(*id)?;
    }

    let highlighted: BTreeSet<Edge> = highlighted
        .into_iter()
        .filter(|e| graph.contains_edge(e.source, e.target))
        .collect();

    tracing::debug!(
        "cleaned graph: dropped {} self-loops and {} isolated nodes",
        loops.len(),
        isolated.len()
    );
    Ok(CleanGraph { graph, highlighted })
}
