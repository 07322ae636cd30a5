//! `streamdir run` – execute the aggregation pipeline.

use std::sync::Arc;

use anyhow::Result;
use streamdir_core::config::StreamdirConfig;
use streamdir_core::fetch::{HttpFetcher, SourceFetcher};
use streamdir_core::notify::LogNotifier;
use streamdir_core::pipeline;

pub async fn run_pipeline(cfg: &StreamdirConfig) -> Result<()> {
    let fetcher: Arc<dyn SourceFetcher> = Arc::new(HttpFetcher::default());
    let report = pipeline::run(cfg, fetcher, &LogNotifier).await?;

    println!(
        "sources: {} ok, {} failed",
        report.fetch.sources_ok, report.fetch.sources_failed
    );
    println!(
        "records: {} seen, {} rejected, {} blocked",
        report.fetch.records, report.fetch.rejected, report.fetch.blocked
    );
    println!(
        "urls: {} unique, {} live, {} dead, {} new",
        report.unique,
        report.live,
        report.dead,
        report.new_urls.len()
    );
    for path in &report.artifacts_written {
        println!("wrote {}", path.display());
    }
    for (path, err) in &report.artifact_errors {
        eprintln!("artifact {} failed: {}", path.display(), err);
    }
    if !report.history_saved {
        eprintln!("warning: history not saved; next run's diff will be stale");
    }
    Ok(())
}
