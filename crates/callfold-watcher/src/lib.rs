//! Live rebuilds on filesystem changes

pub mod watcher;

pub use watcher::{BuildJob, FileWatcher, WatchEvent, WatcherService};
