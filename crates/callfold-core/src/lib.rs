//! Callfold core: call graph model, call-site collapsing and the result cache

pub mod cache;
pub mod classify;
pub mod clean;
pub mod collapse;
pub mod config;
pub mod dot;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod source;


#[cfg(test)]
pub mod test_utils;

pub use model::{NodeId, NodeKind, SourcePosition, GraphNode, Edge};
pub use graph::Graph;
pub use error::{Error, Result};
pub use classify::{NodeRole, Signature, is_declaration, is_call_site, role_of, signature_of, signatures_match};
pub use collapse::{CollapseOutcome, collapse_call_sites};
pub use clean::{CleanGraph, clean};
pub use dot::to_dot;
pub use cache::{CACHE_DIR, DEFAULT_NAMESPACE, CACHE_FORMAT_VERSION, ResultCache, cache_dir, cache_path, ensure_cache_dir, clear_cache};
pub use config::{Config, CONFIG_FILE};
pub use source::{SourceFile, BuildRequest, SourceParser};
pub use pipeline::{BuildPipeline, BuildOutput, BuildReport, fold_graph};
pub use render::{RenderAdapter, DotFileWriter, StdoutRenderer};
