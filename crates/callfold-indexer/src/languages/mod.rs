//! Language extractors turning syntax trees into raw call graphs

pub mod rust;

use tree_sitter::Node;

/// Source text spanned by a node, or "" if the range is not on char boundaries.
pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Node text on a single line with runs of whitespace collapsed.
pub(crate) fn compact_text(node: Node, source: &str) -> String {
    node_text(node, source).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `ERROR` or missing node in document order.
pub(crate) fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_rust::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_compact_text() {
        let source = "fn add(\n    a: i32,\n    b: i32,\n) {}";
        let tree = parse(source);
        let function = tree.root_node().child(0).unwrap();
        let params = function.child_by_field_name("parameters").unwrap();

        assert_eq!(compact_text(params, source), "( a: i32, b: i32, )");
    }

    #[test]
    fn test_first_error_line() {
        let source = "fn ok() {}\n\nfn broken( {\n}\n";
        let tree = parse(source);

        let error = first_error(tree.root_node()).unwrap();
        assert!(error.start_position().row >= 2);
        assert!(first_error(parse("fn ok() {}").root_node()).is_none());
    }
}
