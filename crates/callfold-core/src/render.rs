//! Hand-off points for the serialized graph

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Consumes the DOT text of a finished build. Layout and drawing happen
/// behind this trait.
pub trait RenderAdapter: Send + Sync {
    fn render(&self, dot: &str) -> anyhow::Result<()>;
}

/// Writes the DOT text to a file, replacing any previous output.
pub struct DotFileWriter {
    path: PathBuf,
}

impl DotFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DotFileWriter { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderAdapter for DotFileWriter {
    fn render(&self, dot: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, dot)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::info!("Wrote graph to {}", self.path.display());
        Ok(())
    }
}

/// Prints the DOT text on stdout.
pub struct StdoutRenderer;

impl RenderAdapter for StdoutRenderer {
    fn render(&self, dot: &str) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{dot}").context("Failed to write graph to stdout")?;
        Ok(())
    }
}
