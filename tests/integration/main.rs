//! Integration tests for Callfold
//!
//! These tests drive the built binary and the library crates together.

use callfold_core::{BuildPipeline, BuildRequest, ResultCache, SourceFile, DEFAULT_NAMESPACE};
use callfold_indexer::{ParserPool, RustCallExtractor};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;

const PROGRAM: &str = r#"fn main() {
    let total = add(1, 2);
    report(total);
}

fn add(a: i32, b: i32) -> i32 {
    a + b
}

fn report(value: i32) {
    let _ = value;
}
"#;

fn callfold(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_callfold"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute callfold")
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/main.rs"), PROGRAM).unwrap();
    dir
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_callfold"))
        .arg("--help")
        .output()
        .expect("Failed to execute callfold");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("callfold"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("watch"));
}

#[test]
fn test_build_writes_dot_and_cache() {
    let dir = project();

    let output = callfold(dir.path(), &["build"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let dot = std::fs::read_to_string(dir.path().join("output.dot")).unwrap();
    assert!(dot.starts_with("digraph CallGraph {"));
    assert_eq!(dot.matches("[color=\"red\"]").count(), 2);
    assert!(dot.contains("fn add(a: i32, b: i32)"));
    assert!(dir.path().join(".callfold/graphs.cache").exists());

    let again = callfold(dir.path(), &["build"]);
    assert!(again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("Cache hit"));
    assert_eq!(std::fs::read_to_string(dir.path().join("output.dot")).unwrap(), dot);
}

#[test]
fn test_build_to_stdout() {
    let dir = project();
    let src = dir.path().join("src");

    let output = callfold(dir.path(), &["build", src.to_str().unwrap(), "--output", "-", "--no-cache"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("digraph CallGraph {"));
    assert!(!dir.path().join(".callfold").exists());
    assert!(!dir.path().join("output.dot").exists());
}

#[test]
fn test_strict_build_fails_on_syntax_error() {
    let dir = project();
    std::fs::write(dir.path().join("src/broken.rs"), "fn broken( {\n").unwrap();

    let strict = callfold(dir.path(), &["build", "--strict", "--output", "-"]);
    assert!(!strict.status.success());
    assert!(!dir.path().join(".callfold/graphs.cache").exists());

    let lenient = callfold(dir.path(), &["build", "--output", "-"]);
    assert!(lenient.status.success());
}

#[test]
fn test_config_file_is_honored() {
    let dir = project();
    std::fs::write(
        dir.path().join("callfold.toml"),
        "output = \"graphs/calls.dot\"\nnamespace = \"custom\"\n",
    )
    .unwrap();

    let output = callfold(dir.path(), &["build"]);

    assert!(output.status.success());
    assert!(dir.path().join("graphs/calls.dot").exists());
    assert!(dir.path().join(".callfold/custom.cache").exists());
}

#[test]
fn test_cache_stats_and_clear() {
    let dir = project();
    assert!(callfold(dir.path(), &["build"]).status.success());

    let stats = callfold(dir.path(), &["cache", "stats"]);
    assert!(stats.status.success());
    assert!(String::from_utf8_lossy(&stats.stdout).contains("Entries:    1"));

    let clear = callfold(dir.path(), &["cache", "clear"]);
    assert!(clear.status.success());
    assert!(!dir.path().join(".callfold").exists());
}

/// The persisted cache answers a fresh process without reparsing.
#[test]
fn test_cache_persists_between_pipelines() {
    let dir = TempDir::new().unwrap();
    let request = BuildRequest::new(vec![SourceFile::new("main.rs", PROGRAM)]);

    let first = {
        let cache = Arc::new(ResultCache::load(dir.path(), DEFAULT_NAMESPACE));
        let pipeline = BuildPipeline::new(RustCallExtractor::new(ParserPool::new(1)), cache);
        pipeline.build(&request).unwrap()
    };
    assert!(first.report.persisted);

    let cache = Arc::new(ResultCache::load(dir.path(), DEFAULT_NAMESPACE));
    let pipeline = BuildPipeline::new(RustCallExtractor::new(ParserPool::new(1)), cache);
    let second = pipeline.build(&request).unwrap();

    assert!(second.report.cache_hit);
    assert_eq!(second.dot, first.dot);

    let edited = BuildRequest::new(vec![SourceFile::new("main.rs", format!("{PROGRAM} "))]);
    assert!(!pipeline.build(&edited).unwrap().report.cache_hit);
}

#[test]
fn test_watcher_service_rebuilds() {
    use callfold_core::DotFileWriter;
    use callfold_watcher::{BuildJob, WatcherService};

    let dir = project();
    let job = BuildJob {
        pipeline: Arc::new(BuildPipeline::new(
            RustCallExtractor::new(ParserPool::new(1)),
            Arc::new(ResultCache::in_memory()),
        )),
        renderer: Arc::new(DotFileWriter::new(dir.path().join("live.dot"))),
        inputs: vec![dir.path().join("src")],
        extensions: vec!["rs".to_string()],
    };
    let service = WatcherService::new(job, std::time::Duration::from_millis(50)).unwrap();

    let report = tokio_test::block_on(service.rebuild()).unwrap();

    assert_eq!(report.highlighted, 2);
    assert!(dir.path().join("live.dot").exists());
}
