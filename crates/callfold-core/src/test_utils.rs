//! Test utilities for Callfold

use crate::error::Result;
use crate::graph::Graph;
use crate::model::{GraphNode, NodeId, NodeKind};
use crate::source::{SourceFile, SourceParser};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A free function declaration with the given parameter labels.
pub fn decl(name: &str, labels: &[&str]) -> GraphNode {
    GraphNode::new(NodeKind::Function, name)
        .with_labels(labels.iter().copied())
        .with_description(format!("fn {}({})", name, labels.join(":")))
}

/// A call expression with the given argument labels.
pub fn call(name: &str, labels: &[&str]) -> GraphNode {
    GraphNode::new(NodeKind::Call, name)
        .with_labels(labels.iter().copied())
        .with_description(format!("{}({})", name, labels.join(":")))
}

pub fn file(name: &str) -> GraphNode {
    GraphNode::new(NodeKind::File, name)
}

/// First node with this name, in insertion order.
pub fn find_node(graph: &Graph, name: &str) -> Option<NodeId> {
    graph.all_nodes().find(|n| n.name == name).map(|n| n.id)
}

/// A small program:
///
/// ```text
/// main.rs ─┬─ main ── call helper() ── (nested) call helper(x:)
///          ├─ helper
///          └─ helper(x:)
/// main ── call println()      (no declaration)
/// helper ── call helper()     (recursion)
/// ```
pub fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    let root = graph.add_node(file("main.rs"));
    let main = graph.add_node(decl("main", &[]));
    let helper = graph.add_node(decl("helper", &[]));
    let helper_x = graph.add_node(decl("helper", &["x"]));
    let call_helper = graph.add_node(call("helper", &[]));
    let call_helper_x = graph.add_node(call("helper", &["x"]));
    let call_print = graph.add_node(call("println", &[""]));
    let call_recurse = graph.add_node(call("helper", &[]));

    for (u, v) in [
        (root, main),
        (root, helper),
        (root, helper_x),
        (main, call_helper),
        (call_helper, call_helper_x),
        (main, call_print),
        (helper, call_recurse),
    ] {
        graph.add_directed_edge(u, v).unwrap();
    }
    graph
}

/// Parser double that returns a fixed graph builder and counts invocations.
pub struct CountingParser<F> {
    build: F,
    calls: AtomicUsize,
}

impl<F> CountingParser<F>
where
    F: Fn(&[SourceFile]) -> Result<Graph> + Send + Sync,
{
    pub fn new(build: F) -> Self {
        CountingParser {
            build,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> SourceParser for CountingParser<F>
where
    F: Fn(&[SourceFile]) -> Result<Graph> + Send + Sync,
{
    fn parse(&self, files: &[SourceFile]) -> Result<Graph> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.build)(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_graph_shape() {
        let graph = sample_graph();
        assert_eq!(graph.node_count(), 8);
        assert_eq!(graph.edge_count(), 7);
    }
}
