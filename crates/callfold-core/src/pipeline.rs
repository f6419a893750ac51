//! Build pipeline: cache lookup → parse → collapse → clean → serialize → cache insert

use crate::cache::ResultCache;
use crate::clean::{clean, CleanGraph};
use crate::collapse::{collapse_call_sites, CollapseOutcome};
use crate::dot::to_dot;
use crate::error::Result;
use crate::graph::Graph;
use crate::source::{BuildRequest, SourceParser};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Summary of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub cache_hit: bool,
    pub files: usize,
    pub raw_nodes: usize,
    pub raw_edges: usize,
    pub collapsed: usize,
    pub unmatched: usize,
    pub nodes: usize,
    pub edges: usize,
    pub highlighted: usize,
    /// True when this build wrote the cache. False on a cache hit, with the
    /// cache disabled, or when writing failed; the build still succeeded.
    pub persisted: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub dot: String,
    pub report: BuildReport,
}

/// Collapse and clean a raw graph.
pub fn fold_graph(mut graph: Graph) -> Result<(CleanGraph, CollapseOutcome)> {
    let outcome = collapse_call_sites(&mut graph)?;
    let clean = clean(graph, outcome.highlighted.clone())?;
    Ok((clean, outcome))
}

/// Runs builds against a parser and a shared result cache.
///
/// Each build owns its graph; only the cache is shared between builds.
pub struct BuildPipeline<P> {
    parser: P,
    cache: Arc<ResultCache>,
    use_cache: bool,
}

impl<P: SourceParser> BuildPipeline<P> {
    pub fn new(parser: P, cache: Arc<ResultCache>) -> Self {
        BuildPipeline {
            parser,
            cache,
            use_cache: true,
        }
    }

    /// Skip cache lookups and inserts; every build recomputes.
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Build the DOT text for a request.
    ///
    /// Parse failures abort the build without touching the cache. Failing to
    /// persist the cache is logged and reported but does not fail the build.
    pub fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        let started = Instant::now();
        let key = request.cache_key();
        let mut report = BuildReport {
            files: request.files.len(),
            ..BuildReport::default()
        };

        if self.use_cache {
            if let Some(dot) = self.cache.lookup(&key) {
                tracing::info!("Cache hit for {} files, skipping build", request.files.len());
                report.cache_hit = true;
                report.elapsed_ms = started.elapsed().as_millis() as u64;
                return Ok(BuildOutput { dot, report });
            }
        }

        let graph = self.parser.parse(&request.files)?;
        report.raw_nodes = graph.node_count();
        report.raw_edges = graph.edge_count();
        tracing::debug!("Parsed {} nodes, {} edges", report.raw_nodes, report.raw_edges);

        let (clean, outcome) = fold_graph(graph)?;
        report.collapsed = outcome.collapsed;
        report.unmatched = outcome.unmatched;
        report.nodes = clean.graph().node_count();
        report.edges = clean.graph().edge_count();
        report.highlighted = clean.highlighted().len();

        let dot = to_dot(&clean);

        if self.use_cache {
            self.cache.insert(key, dot.clone());
            match self.cache.persist() {
                Ok(()) => report.persisted = true,
                Err(e) => tracing::warn!("Failed to persist result cache: {}", e),
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "Built graph: {} nodes, {} edges ({} collapsed, {} unmatched) in {}ms",
            report.nodes,
            report.edges,
            report.collapsed,
            report.unmatched,
            report.elapsed_ms
        );
        Ok(BuildOutput { dot, report })
    }
}
