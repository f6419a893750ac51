//! Build configuration, read from `callfold.toml` at the project root

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the project root.
pub const CONFIG_FILE: &str = "callfold.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults to `<root>/.callfold`. Relative paths resolve against the root.
    pub cache_dir: Option<PathBuf>,
    pub namespace: String,
    /// File extensions collected when a directory is given.
    pub extensions: Vec<String>,
    /// Fail the build when the syntax tree contains errors.
    pub strict: bool,
    pub output: PathBuf,
    /// Quiet period before a watch-mode rebuild.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_dir: None,
            namespace: crate::cache::DEFAULT_NAMESPACE.to_string(),
            extensions: vec!["rs".to_string()],
            strict: false,
            output: PathBuf::from("output.dot"),
            debounce_ms: 300,
        }
    }
}

impl Config {
    /// Load `<root>/callfold.toml`, or defaults when it does not exist.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Config::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Directory holding the result cache for a project rooted at `root`.
    pub fn cache_dir(&self, root: &Path) -> PathBuf {
        match &self.cache_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => crate::cache::cache_dir(root),
        }
    }
}
