//! Collapse call-site nodes into the declarations they invoke

use crate::classify::{is_call_site, is_declaration, signature_of};
use crate::error::Result;
use crate::graph::Graph;
use crate::model::{Edge, GraphNode, NodeId, SourcePosition};
use std::collections::BTreeSet;

/// What a collapsing pass did to the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Edges created by redirecting a call site's callers onto its declaration.
    pub highlighted: BTreeSet<Edge>,
    /// Call sites replaced by their declaration.
    pub collapsed: usize,
    /// Call sites with no matching declaration, left in place.
    pub unmatched: usize,
}

/// Order in which declarations compete for a call site: source position
/// first, insertion order second. Nodes without a position sort first.
fn tie_break_key(node: &GraphNode) -> (Option<SourcePosition>, NodeId) {
    (node.position, node.id)
}

/// Find the declaration each call site resolves to, in graph iteration order.
fn plan(graph: &Graph) -> Vec<(NodeId, Option<NodeId>)> {
    let mut declarations: Vec<&GraphNode> = graph.all_nodes().filter(|n| is_declaration(n)).collect();
    declarations.sort_by_key(|d| tie_break_key(d));

    graph
        .all_nodes()
        .filter(|n| is_call_site(n))
        .map(|call| {
            let signature = signature_of(call);
            let target = declarations
                .iter()
                .find(|d| signature_of(d) == signature)
                .map(|d| d.id);
            (call.id, target)
        })
        .collect()
}

/// Replace every call site that matches a declaration by direct
/// caller → declaration edges, then remove the call site.
///
/// Only edges pointing at the call site are redirected. Edges leaving it are
/// dropped along with the node. Unmatched call sites are left untouched.
/// Declarations are never removed, so the match for each call site does not
/// depend on earlier rewrites.
pub fn collapse_call_sites(graph: &mut Graph) -> Result<CollapseOutcome> {
    let mut outcome = CollapseOutcome::default();

    for (call, target) in plan(graph) {
        let Some(declaration) = target else {
            outcome.unmatched += 1;
            continue;
        };

        for caller in graph.incoming(call)? {
            if caller == call {
                continue;
            }
            graph.add_directed_edge(caller, declaration)?;
            outcome.highlighted.insert(Edge::new(caller, declaration));
        }

        graph.remove_node(call)?;
        // An earlier redirect may have started at this call site.
        outcome.highlighted.retain(|e| !e.touches(call));
        outcome.collapsed += 1;

        tracing::trace!("collapsed call site {} into {}", call, declaration);
    }

    tracing::debug!(
        "collapsed {} call sites, {} unmatched, {} highlighted edges",
        outcome.collapsed,
        outcome.unmatched,
        outcome.highlighted.len()
    );
    Ok(outcome)
}
