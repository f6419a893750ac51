//! Node classification and call-signature matching
//!
//! Matching compares names and the ordered label sequence only, never
//! parameter types. Overloads that differ only in unlabeled positional types
//! are indistinguishable here; the collapser's tie-break decides between them.

use crate::model::{GraphNode, NodeKind};

/// What part a node plays in collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Declaration,
    CallSite,
    Other,
}

/// Name plus ordered labels of a declaration or call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature<'a> {
    pub name: &'a str,
    pub labels: &'a [String],
}

pub fn is_declaration(node: &GraphNode) -> bool {
    matches!(
        node.kind,
        NodeKind::Function | NodeKind::Method | NodeKind::AssociatedFunction
    )
}

pub fn is_call_site(node: &GraphNode) -> bool {
    matches!(node.kind, NodeKind::Call | NodeKind::MethodCall)
}

pub fn role_of(node: &GraphNode) -> NodeRole {
    if is_declaration(node) {
        NodeRole::Declaration
    } else if is_call_site(node) {
        NodeRole::CallSite
    } else {
        NodeRole::Other
    }
}

pub fn signature_of(node: &GraphNode) -> Signature<'_> {
    Signature {
        name: &node.name,
        labels: &node.labels,
    }
}

/// True iff names are equal and label sequences are equal element-wise.
pub fn signatures_match(a: &GraphNode, b: &GraphNode) -> bool {
    signature_of(a) == signature_of(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let decl = GraphNode::new(NodeKind::Method, "run");
        let call = GraphNode::new(NodeKind::MethodCall, "run");
        let file = GraphNode::new(NodeKind::File, "main.rs");

        assert_eq!(role_of(&decl), NodeRole::Declaration);
        assert_eq!(role_of(&call), NodeRole::CallSite);
        assert_eq!(role_of(&file), NodeRole::Other);
        assert!(!is_call_site(&decl));
        assert!(!is_declaration(&call));
    }

    #[test]
    fn test_signature_match_requires_equal_labels() {
        let decl = GraphNode::new(NodeKind::Function, "move").with_labels(["to", ""]);
        let same = GraphNode::new(NodeKind::Call, "move").with_labels(["to", ""]);
        let reordered = GraphNode::new(NodeKind::Call, "move").with_labels(["", "to"]);
        let shorter = GraphNode::new(NodeKind::Call, "move").with_labels(["to"]);
        let renamed = GraphNode::new(NodeKind::Call, "shift").with_labels(["to", ""]);

        assert!(signatures_match(&decl, &same));
        assert!(!signatures_match(&decl, &reordered));
        assert!(!signatures_match(&decl, &shorter));
        assert!(!signatures_match(&decl, &renamed));
    }

    #[test]
    fn test_empty_signatures_match() {
        let decl = GraphNode::new(NodeKind::Function, "f");
        let call = GraphNode::new(NodeKind::Call, "f");
        assert!(signatures_match(&decl, &call));
    }
}
