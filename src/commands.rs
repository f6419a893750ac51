//! CLI command implementations

use crate::BuildArgs;
use anyhow::Context;
use callfold_core::{
    clear_cache, BuildPipeline, BuildReport, Config, DotFileWriter, RenderAdapter, ResultCache,
    StdoutRenderer,
};
use callfold_indexer::{create_parser_pool, RustCallExtractor};
use callfold_watcher::{BuildJob, WatcherService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Config::from_file(path),
        None => Config::load(root),
    }
}

pub async fn build(root: PathBuf, config: Config, args: BuildArgs) -> anyhow::Result<()> {
    let strict = args.strict || config.strict;
    let use_cache = !args.no_cache;
    let job = build_job(&root, &config, args.paths, args.output, strict, use_cache);

    let report = tokio::task::spawn_blocking(move || job.run())
        .await
        .context("Build task failed")??;

    print_report(&report, use_cache);
    Ok(())
}

pub async fn watch(
    root: PathBuf,
    config: Config,
    paths: Vec<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let debounce = Duration::from_millis(config.debounce_ms);
    let job = build_job(&root, &config, paths, output, config.strict, true);
    let service = WatcherService::new(job, debounce)?;

    tracing::info!("Watching for changes, press Ctrl-C to stop");
    tokio::select! {
        result = service.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Stopping watcher");
            Ok(())
        }
    }
}

pub fn cache_stats(root: &Path, config: &Config) -> anyhow::Result<()> {
    let cache = ResultCache::load(&config.cache_dir(root), &config.namespace);

    match cache.path() {
        Some(path) => println!("Cache file: {}", path.display()),
        None => println!("Cache file: (in memory)"),
    }
    println!("Entries:    {}", cache.len());
    println!("Size:       {} bytes", cache.size_bytes());
    Ok(())
}

pub fn cache_clear(root: &Path, config: &Config) -> anyhow::Result<()> {
    let dir = config.cache_dir(root);
    tracing::info!("Clearing cache: {}", dir.display());

    clear_cache(&dir).with_context(|| format!("Failed to remove {}", dir.display()))?;

    tracing::info!("Cache cleared");
    Ok(())
}

fn build_job(
    root: &Path,
    config: &Config,
    paths: Vec<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    use_cache: bool,
) -> BuildJob<RustCallExtractor> {
    let extractor = RustCallExtractor::new(create_parser_pool()).strict(strict);

    let pipeline = if use_cache {
        let cache = ResultCache::load(&config.cache_dir(root), &config.namespace);
        BuildPipeline::new(extractor, Arc::new(cache))
    } else {
        BuildPipeline::new(extractor, Arc::new(ResultCache::in_memory())).without_cache()
    };

    let output = output.unwrap_or_else(|| root.join(&config.output));
    let renderer: Arc<dyn RenderAdapter> = if output.as_os_str() == "-" {
        Arc::new(StdoutRenderer)
    } else {
        Arc::new(DotFileWriter::new(output))
    };

    let inputs = if paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        paths
    };

    BuildJob {
        pipeline: Arc::new(pipeline),
        renderer,
        inputs,
        extensions: config.extensions.clone(),
    }
}

fn print_report(report: &BuildReport, use_cache: bool) {
    if report.cache_hit {
        eprintln!("Cache hit: {} files, {}ms", report.files, report.elapsed_ms);
        return;
    }
    eprintln!(
        "Built {} files: {} nodes, {} edges ({} highlighted)",
        report.files, report.nodes, report.edges, report.highlighted
    );
    eprintln!(
        "Parsed {} nodes, {} edges; collapsed {} call sites, {} unmatched",
        report.raw_nodes, report.raw_edges, report.collapsed, report.unmatched
    );
    if use_cache && !report.persisted {
        eprintln!("Warning: result cache was not saved");
    }
    eprintln!("Done in {}ms", report.elapsed_ms);
}
