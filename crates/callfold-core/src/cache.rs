//! Persistent result cache: exact source text → serialized graph
//!
//! One JSON file per namespace (`<cache dir>/<namespace>.cache`) holding a
//! format version, a save timestamp and the full key/value map. Entries never
//! expire and are never evicted.

use crate::error::{Error, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Cache directory: .callfold/
pub const CACHE_DIR: &str = ".callfold";

/// Namespace holding built graphs.
pub const DEFAULT_NAMESPACE: &str = "graphs";

/// Bumped whenever the shape of persisted values changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Get the file backing a namespace
pub fn cache_path(dir: &Path, namespace: &str) -> PathBuf {
    dir.join(format!("{namespace}.cache"))
}

/// Ensure cache directory exists
pub fn ensure_cache_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Clear cache directory
pub fn clear_cache(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    saved_at: String,
    entries: BTreeMap<String, String>,
}

/// Key/value store from the exact concatenated source text of a build to the
/// DOT text it produced.
///
/// Safe to share between concurrent builds. Inserts from different builds
/// never tear; persisting is last-write-wins.
pub struct ResultCache {
    entries: DashMap<String, String>,
    path: Option<PathBuf>,
    persist_lock: Mutex<()>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entries.len())
            .field("path", &self.path)
            .finish()
    }
}

impl ResultCache {
    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        ResultCache {
            entries: DashMap::new(),
            path: None,
            persist_lock: Mutex::new(()),
        }
    }

    /// Load the namespace from `dir`.
    ///
    /// Missing, unreadable, malformed or version-mismatched storage yields an
    /// empty cache; the reason is logged and the next `persist` overwrites it.
    pub fn load(dir: &Path, namespace: &str) -> Self {
        let path = cache_path(dir, namespace);

        let stored = if path.exists() {
            match Self::read_file(&path) {
                Ok(stored) => {
                    tracing::debug!("Loaded {} cached graphs from {}", stored.len(), path.display());
                    stored
                }
                Err(e) => {
                    tracing::warn!("Ignoring cache at {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            tracing::debug!("No cache found at {}", path.display());
            BTreeMap::new()
        };
        let entries: DashMap<String, String> = stored.into_iter().collect();

        ResultCache {
            entries,
            path: Some(path),
            persist_lock: Mutex::new(()),
        }
    }

    /// Previously stored value for exactly this key.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    /// Store a value, replacing any entry with the same key.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Write every entry to durable storage.
    ///
    /// The file is replaced atomically, so a failed write leaves the previous
    /// contents in place. In-memory caches have nothing to do.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());

        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            entries: self
                .entries
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect(),
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        ensure_cache_dir(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, &file)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Persisted {} cached graphs to {}", file.entries.len(), path.display());
        Ok(())
    }

    /// Drop every entry from memory. Storage is untouched until the next `persist`.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes held in keys and values.
    pub fn size_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|r| r.key().len() + r.value().len())
            .sum()
    }

    /// File backing this cache, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, String>> {
        let json = std::fs::read_to_string(path)?;
        let file: CacheFile = serde_json::from_str(&json)?;
        if file.version != CACHE_FORMAT_VERSION {
            return Err(Error::CacheVersion {
                found: file.version,
                expected: CACHE_FORMAT_VERSION,
            });
        }
        Ok(file.entries)
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::in_memory()
    }
}
