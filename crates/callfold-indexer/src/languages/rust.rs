//! Rust call extractor using tree-sitter

use super::{compact_text, first_error, node_text};
use crate::parser_pool::{create_parser_pool, FileType, ParseRequest, ParserPool};
use callfold_core::{
    Error, Graph, GraphNode, NodeId, NodeKind, Result, SourceFile, SourceParser, SourcePosition,
};
use tree_sitter::Node;

/// Parses Rust sources into a raw call graph.
///
/// Every file gets a `File` node. `mod`, `impl` and `trait` blocks become
/// container nodes, functions become declarations and `call_expression`s
/// become call sites. Each item hangs off its owner: the nearest enclosing
/// function if there is one, otherwise the nearest container.
///
/// Rust has no argument labels, so every label is the empty string and two
/// signatures match when the name and the arity agree. A declaration's
/// `self` parameter is not counted; neither is a method call's receiver.
pub struct RustCallExtractor {
    parser_pool: ParserPool,
    strict: bool,
}

impl RustCallExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self {
            parser_pool,
            strict: false,
        }
    }

    /// Reject sources whose syntax tree contains errors instead of
    /// extracting what tree-sitter recovered.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn extract_file(&self, index: u32, file: &SourceFile, graph: &mut Graph) -> Result<()> {
        let file_type = FileType::from_path(&file.path).ok_or_else(|| {
            Error::Parse(format!("{}: unsupported file type", file.path.display()))
        })?;

        let parsed = self
            .parser_pool
            .parse_blocking(ParseRequest {
                file_type,
                content: file.content.clone(),
                path: file.path.clone(),
            })
            .map_err(|e| Error::Parse(format!("{}: {:#}", file.path.display(), e)))?;
        let root = parsed.tree.root_node();

        if let Some(error) = first_error(root) {
            let line = error.start_position().row + 1;
            if self.strict {
                return Err(Error::Parse(format!(
                    "{}:{}: syntax error",
                    file.path.display(),
                    line
                )));
            }
            tracing::warn!(
                "{}:{}: syntax error, extracting recovered tree",
                file.path.display(),
                line
            );
        }

        let file_node = graph.add_node(
            GraphNode::new(NodeKind::File, file_name(file))
                .with_description(file.path.display().to_string())
                .at(SourcePosition::new(index, 0, 1)),
        );

        let mut walker = FileWalker {
            graph,
            source: &file.content,
            file: index,
        };
        walker.visit_children(root, &Scope::container(file_node, NodeKind::File))
    }
}

impl Default for RustCallExtractor {
    fn default() -> Self {
        Self::new(create_parser_pool())
    }
}

impl SourceParser for RustCallExtractor {
    fn parse(&self, files: &[SourceFile]) -> Result<Graph> {
        let mut graph = Graph::new();
        for (index, file) in files.iter().enumerate() {
            self.extract_file(index as u32, file, &mut graph)?;
        }
        tracing::debug!(
            "Extracted {} nodes, {} edges from {} files",
            graph.node_count(),
            graph.edge_count(),
            files.len()
        );
        Ok(graph)
    }
}

fn file_name(file: &SourceFile) -> String {
    file.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.path.display().to_string())
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    container: NodeId,
    container_kind: NodeKind,
    declaration: Option<NodeId>,
}

impl Scope {
    fn container(id: NodeId, kind: NodeKind) -> Self {
        Scope {
            container: id,
            container_kind: kind,
            declaration: None,
        }
    }

    fn within(self, declaration: NodeId) -> Self {
        Scope {
            declaration: Some(declaration),
            ..self
        }
    }

    fn owner(&self) -> NodeId {
        self.declaration.unwrap_or(self.container)
    }

    /// Functions directly inside an impl or trait block are methods or
    /// associated functions; anything nested in a body is a plain function.
    fn in_type_body(&self) -> bool {
        self.declaration.is_none() && matches!(self.container_kind, NodeKind::Impl | NodeKind::Trait)
    }
}

struct FileWalker<'a> {
    graph: &'a mut Graph,
    source: &'a str,
    file: u32,
}

impl<'a> FileWalker<'a> {
    fn visit(&mut self, node: Node, scope: &Scope) -> Result<()> {
        match node.kind() {
            "mod_item" => self.visit_container(node, NodeKind::Module, scope),
            "impl_item" => self.visit_container(node, NodeKind::Impl, scope),
            "trait_item" => self.visit_container(node, NodeKind::Trait, scope),
            "function_item" | "function_signature_item" => {
                let id = self.add_declaration(node, scope)?;
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit(body, &scope.within(id))?;
                }
                Ok(())
            }
            "call_expression" => {
                self.add_call(node, scope)?;
                // Calls in the callee or the arguments belong to the same owner.
                self.visit_children(node, scope)
            }
            // Macro bodies are unparsed token trees.
            "token_tree" => Ok(()),
            _ => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: Node, scope: &Scope) -> Result<()> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, scope)?;
        }
        Ok(())
    }

    fn visit_container(&mut self, node: Node, kind: NodeKind, scope: &Scope) -> Result<()> {
        let (name, description) = match kind {
            NodeKind::Impl => {
                let ty = self.field_text(node, "type");
                match node.child_by_field_name("trait") {
                    Some(tr) => {
                        let name = format!("{} for {}", node_text(tr, self.source), ty);
                        (name.clone(), format!("impl {}", name))
                    }
                    None => (ty.to_string(), format!("impl {}", ty)),
                }
            }
            NodeKind::Trait => {
                let name = self.field_text(node, "name");
                (name.to_string(), format!("trait {}", name))
            }
            _ => {
                let name = self.field_text(node, "name");
                (name.to_string(), format!("mod {}", name))
            }
        };

        let entry = GraphNode::new(kind, name)
            .with_description(description)
            .at(self.position(node));
        let id = self.insert(entry, scope)?;

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, &Scope::container(id, kind))?;
        }
        Ok(())
    }

    fn add_declaration(&mut self, node: Node, scope: &Scope) -> Result<NodeId> {
        let name = self.field_text(node, "name");
        let params = node.child_by_field_name("parameters");

        let has_self = params.is_some_and(|p| {
            let mut cursor = p.walk();
            let found = p.named_children(&mut cursor).any(|c| c.kind() == "self_parameter");
            found
        });
        let labels = params.map(|p| positional_labels(p, &["self_parameter"])).unwrap_or_default();

        let kind = match (scope.in_type_body(), has_self) {
            (true, true) => NodeKind::Method,
            (true, false) => NodeKind::AssociatedFunction,
            (false, _) => NodeKind::Function,
        };
        let description = format!(
            "fn {}{}",
            name,
            params.map(|p| compact_text(p, self.source)).unwrap_or_default()
        );

        let entry = GraphNode::new(kind, name)
            .with_labels(labels)
            .with_description(description)
            .at(self.position(node));
        self.insert(entry, scope)
    }

    fn add_call(&mut self, node: Node, scope: &Scope) -> Result<NodeId> {
        let callee = node.child_by_field_name("function");
        let (name, kind) = match callee {
            Some(f) => self.callee_name(f),
            None => (String::new(), NodeKind::Call),
        };
        let labels = node
            .child_by_field_name("arguments")
            .map(|a| positional_labels(a, &[]))
            .unwrap_or_default();
        let description = format!(
            "{}({})",
            callee.map(|f| compact_text(f, self.source)).unwrap_or_default(),
            if labels.is_empty() { "" } else { ".." }
        );

        let entry = GraphNode::new(kind, name)
            .with_labels(labels)
            .with_description(description)
            .at(self.position(node));
        self.insert(entry, scope)
    }

    /// Name the call resolves by, and whether it is a method call.
    fn callee_name(&self, function: Node) -> (String, NodeKind) {
        match function.kind() {
            "identifier" => (node_text(function, self.source).to_string(), NodeKind::Call),
            "scoped_identifier" => (self.field_text(function, "name").to_string(), NodeKind::Call),
            "field_expression" => (
                self.field_text(function, "field").to_string(),
                NodeKind::MethodCall,
            ),
            "generic_function" => match function.child_by_field_name("function") {
                Some(inner) => self.callee_name(inner),
                None => (compact_text(function, self.source), NodeKind::Call),
            },
            _ => (compact_text(function, self.source), NodeKind::Call),
        }
    }

    fn insert(&mut self, entry: GraphNode, scope: &Scope) -> Result<NodeId> {
        let id = self.graph.add_node(entry);
        self.graph.add_directed_edge(scope.owner(), id)?;
        Ok(id)
    }

    fn field_text(&self, node: Node, field: &str) -> &'a str {
        node.child_by_field_name(field)
            .map(|n| node_text(n, self.source))
            .unwrap_or("")
    }

    fn position(&self, node: Node) -> SourcePosition {
        SourcePosition::new(
            self.file,
            node.start_byte() as u32,
            node.start_position().row as u32 + 1,
        )
    }
}

/// One empty label per parameter or argument, skipping comments,
/// attributes and the listed kinds.
fn positional_labels(list: Node, skip: &[&str]) -> Vec<String> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|c| {
            !matches!(c.kind(), "line_comment" | "block_comment" | "attribute_item")
                && !skip.contains(&c.kind())
        })
        .map(|_| String::new())
        .collect()
}
