//! Filesystem watcher and the rebuild loop driven by it

use anyhow::{Context, Result};
use callfold_core::{BuildPipeline, BuildReport, BuildRequest, RenderAdapter, SourceParser};
use callfold_indexer::{collect_sources, has_extension, read_sources};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(path) | WatchEvent::Modified(path) | WatchEvent::Removed(path) => path,
        }
    }
}

/// Watches source files and forwards relevant changes over a channel.
///
/// Only changes to a watched file, or to a file under a watched directory,
/// are reported. Single files are watched through their parent directory, so
/// edits to siblings reach the channel and are dropped by [`next_event`].
///
/// [`next_event`]: FileWatcher::next_event
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    files: HashSet<PathBuf>,
    directories: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a watcher reporting changes to files with one of `extensions`.
    pub fn new(extensions: Vec<String>) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    debug!("File system event: {:?}", event);
                    Self::handle_notify_event(event, &extensions, &event_tx);
                }
                Err(e) => {
                    error!("File system watch error: {}", e);
                }
            }
        })?;

        Ok(Self {
            watcher,
            event_rx,
            files: HashSet::new(),
            directories: Vec::new(),
        })
    }

    fn handle_notify_event(
        event: notify::Event,
        extensions: &[String],
        event_tx: &mpsc::UnboundedSender<WatchEvent>,
    ) {
        let make: fn(PathBuf) -> WatchEvent = match event.kind {
            notify::EventKind::Create(_) => WatchEvent::Created,
            notify::EventKind::Modify(_) => WatchEvent::Modified,
            notify::EventKind::Remove(_) => WatchEvent::Removed,
            _ => return,
        };

        for path in event.paths {
            if should_ignore_path(&path) || !has_extension(&path, extensions) {
                continue;
            }
            if let Err(e) = event_tx.send(make(path)) {
                warn!("Failed to forward watch event: {}", e);
            }
        }
    }

    /// Watch a directory recursively
    pub fn watch_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Watching directory: {:?}", path);

        self.watcher.watch(path, RecursiveMode::Recursive)?;
        self.directories.push(normalize(path));
        Ok(())
    }

    /// Watch a single file through its parent directory, so editors that
    /// save by renaming are still seen.
    pub fn watch_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        info!("Watching file: {:?}", path);

        self.watcher.watch(parent, RecursiveMode::NonRecursive)?;
        self.files.insert(normalize(path));
        Ok(())
    }

    /// Wait for the next event on a watched path. `None` once the watcher is gone.
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        while let Some(event) = self.event_rx.recv().await {
            if self.is_watching(event.path()) {
                return Some(event);
            }
            debug!("Dropping event outside the watched paths: {:?}", event.path());
        }
        None
    }

    /// Whether `path` is a watched file or lies under a watched directory.
    pub fn is_watching(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files.contains(&path) || self.directories.iter().any(|dir| path.starts_with(dir))
    }
}

/// Canonical form of a path for scope checks. Removed files no longer
/// resolve, so fall back to the canonical parent joined with the file name.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => parent
            .canonicalize()
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// One full build from disk: collect, read, build, render.
pub struct BuildJob<P> {
    pub pipeline: Arc<BuildPipeline<P>>,
    pub renderer: Arc<dyn RenderAdapter>,
    pub inputs: Vec<PathBuf>,
    pub extensions: Vec<String>,
}

impl<P> Clone for BuildJob<P> {
    fn clone(&self) -> Self {
        BuildJob {
            pipeline: Arc::clone(&self.pipeline),
            renderer: Arc::clone(&self.renderer),
            inputs: self.inputs.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

impl<P: SourceParser> BuildJob<P> {
    pub fn run(&self) -> Result<BuildReport> {
        let paths = collect_sources(&self.inputs, &self.extensions)?;
        let request = BuildRequest::new(read_sources(&paths)?);
        let output = self.pipeline.build(&request).context("Build failed")?;
        self.renderer.render(&output.dot)?;
        Ok(output.report)
    }
}

/// Rebuilds whenever watched sources change.
pub struct WatcherService<P> {
    watcher: FileWatcher,
    job: BuildJob<P>,
    debounce: Duration,
}

impl<P: SourceParser + 'static> WatcherService<P> {
    pub fn new(job: BuildJob<P>, debounce: Duration) -> Result<Self> {
        let watcher = FileWatcher::new(job.extensions.clone())?;
        Ok(Self {
            watcher,
            job,
            debounce,
        })
    }

    /// Start watching every build input.
    pub fn start_watching(&mut self) -> Result<()> {
        for input in &self.job.inputs {
            if input.is_dir() {
                self.watcher.watch_directory(input)?;
            } else {
                self.watcher.watch_file(input)?;
            }
        }
        Ok(())
    }

    /// Run one build on a blocking worker. Failures are logged, never fatal.
    pub async fn rebuild(&self) -> Option<BuildReport> {
        let job = self.job.clone();
        match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(Ok(report)) => {
                info!(
                    "Rebuilt graph: {} nodes, {} edges{}",
                    report.nodes,
                    report.edges,
                    if report.cache_hit { " (cached)" } else { "" }
                );
                Some(report)
            }
            Ok(Err(e)) => {
                error!("Rebuild failed: {:#}", e);
                None
            }
            Err(e) => {
                error!("Build task failed: {}", e);
                None
            }
        }
    }

    /// Wait until no event has arrived for the debounce period.
    async fn settle(&mut self) {
        loop {
            match tokio::time::timeout(self.debounce, self.watcher.next_event()).await {
                Ok(Some(event)) => debug!("Coalescing {:?}", event),
                Ok(None) | Err(_) => break,
            }
        }
    }

    /// Build once, then rebuild after every settled batch of changes.
    pub async fn run(mut self) -> Result<()> {
        self.start_watching()?;
        self.rebuild().await;

        while let Some(event) = self.watcher.next_event().await {
            info!("Change detected: {:?}", event.path());
            self.settle().await;
            self.rebuild().await;
        }

        info!("Watcher stopped");
        Ok(())
    }
}

/// Check if a path should be ignored (e.g., target/, .git/, etc.)
fn should_ignore_path(path: &Path) -> bool {
    path.components().any(|component| {
        matches!(
            component.as_os_str().to_str(),
            Some("target") | Some(".git") | Some(callfold_core::CACHE_DIR)
        )
    })
}
