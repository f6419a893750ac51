//! Build input and the parser interface consumed by the pipeline

use crate::error::Result;
use crate::graph::Graph;
use std::path::PathBuf;

/// One selected source file, read in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// The ordered set of files a build runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub files: Vec<SourceFile>,
}

impl BuildRequest {
    pub fn new(files: Vec<SourceFile>) -> Self {
        BuildRequest { files }
    }

    /// Exact concatenation of every file's text, in request order.
    ///
    /// Any change to a file, to the selection, or to the order yields a
    /// different key.
    pub fn cache_key(&self) -> String {
        self.files.iter().map(|f| f.content.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Turns source files into a raw graph of declarations, call sites and
/// their syntactic adjacency.
///
/// Implementations fail with [`crate::Error::Parse`] and produce no partial
/// graph when the input cannot be parsed.
pub trait SourceParser: Send + Sync {
    fn parse(&self, files: &[SourceFile]) -> Result<Graph>;
}

impl<P: SourceParser + ?Sized> SourceParser for Box<P> {
    fn parse(&self, files: &[SourceFile]) -> Result<Graph> {
        (**self).parse(files)
    }
}

impl<P: SourceParser + ?Sized> SourceParser for std::sync::Arc<P> {
    fn parse(&self, files: &[SourceFile]) -> Result<Graph> {
        (**self).parse(files)
    }
}
