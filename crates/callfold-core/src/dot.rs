//! DOT serialization of a cleaned call graph
//!
//! The output is deterministic for a given graph: highlighted edges first,
//! then the remaining edges, both sorted by endpoint ids, then node
//! declarations in insertion order. This text is what the result cache stores.

use crate::classify::{role_of, NodeRole};
use crate::clean::CleanGraph;
use crate::model::{Edge, GraphNode};

/// Color applied to edges produced by collapsing.
pub const HIGHLIGHT_COLOR: &str = "red";

/// Convert a cleaned graph to a DOT string.
pub fn to_dot(graph: &CleanGraph) -> String {
    let mut lines = Vec::new();

    lines.push("digraph CallGraph {".to_string());
    lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());

    for edge in graph.highlighted() {
        lines.push(format!(
            "    {} [color=\"{}\"];",
            edge_statement(edge),
            HIGHLIGHT_COLOR
        ));
    }

    for edge in graph.plain_edges() {
        lines.push(format!("    {};", edge_statement(&edge)));
    }

    for node in graph.nodes() {
        lines.push(format!(
            "    \"{}\" [label=\"{}\", shape={}];",
            node.id,
            escape_label(&node.description),
            shape_for(node)
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn edge_statement(edge: &Edge) -> String {
    format!("\"{}\" -> \"{}\"", edge.source, edge.target)
}

fn shape_for(node: &GraphNode) -> &'static str {
    match role_of(node) {
        NodeRole::Declaration => "box",
        // Calls that survive collapsing point outside the input.
        NodeRole::CallSite => "ellipse",
        NodeRole::Other => "folder",
    }
}

/// Escape special characters for DOT labels.
pub fn escape_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
