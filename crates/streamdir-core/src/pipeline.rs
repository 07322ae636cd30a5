//! The aggregation pipeline: fetch -> normalize/filter -> dedup -> probe ->
//! diff -> export -> persist history.
//!
//! Source and probe failures are local (skip / classify dead); per-artifact
//! write failures are recorded in the report while the other artifacts still
//! attempt to write. Only an invalid config aborts the run.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::blocklist::Blocklist;
use crate::config::StreamdirConfig;
use crate::export;
use crate::fetch::{self, FetchStats, SourceFetcher};
use crate::history::HistorySet;
use crate::notify::{Notifier, NotifyEvent};
use crate::probe::{self, ProbeOptions, ProbeProgress};
use crate::resultset::{self, ResultSet};

/// Everything one run produced, counters included.
#[derive(Debug)]
pub struct RunReport {
    pub fetch: FetchStats,
    /// Unique URLs after filtering and dedup (pre-validation).
    pub unique: usize,
    /// URLs that answered the liveness probe.
    pub live: usize,
    /// URLs dropped by validation.
    pub dead: usize,
    /// URLs not present in the previous run's history, sorted.
    pub new_urls: std::collections::BTreeSet<String>,
    pub artifacts_written: Vec<PathBuf>,
    /// Artifacts that failed to write, with the failure rendered for the
    /// caller. Other artifacts are unaffected.
    pub artifact_errors: Vec<(PathBuf, String)>,
    /// False when the history file could not be persisted (next run's diff
    /// will be based on stale history).
    pub history_saved: bool,
    /// The final, validated result set.
    pub result: ResultSet,
}

/// Run the full pipeline. `fetcher` supplies upstream listings; `notifier`
/// receives summary events (best-effort).
pub async fn run(
    cfg: &StreamdirConfig,
    fetcher: Arc<dyn SourceFetcher>,
    notifier: &dyn Notifier,
) -> Result<RunReport> {
    cfg.validate().context("invalid configuration")?;

    let history_path = cfg.history_path()?;
    let history = HistorySet::load(&history_path);

    // Fetch phase: bounded pool of source fetches feeding the single-writer
    // collector. Must fully join before validation starts.
    let blocklist = Blocklist::new(cfg.blocklist.iter().cloned());
    let (tx, rx) = mpsc::channel(256);
    let collector = tokio::spawn(resultset::collect(rx));
    let fetch_stats =
        fetch::run_fetch_pool(fetcher, &cfg.sources, &blocklist, cfg.fetch_workers, tx).await;
    let set = collector.await.context("candidate collector")?;
    let unique = set.len();
    tracing::info!(
        sources_ok = fetch_stats.sources_ok,
        sources_failed = fetch_stats.sources_failed,
        records = fetch_stats.records,
        rejected = fetch_stats.rejected,
        blocked = fetch_stats.blocked,
        unique,
        "fetch phase complete"
    );

    // Validation phase: replaces the set with its live sub-mapping.
    let opts = ProbeOptions {
        connect_timeout: cfg.connect_timeout(),
        total_timeout: cfg.total_timeout(),
        workers: cfg.probe_workers,
        progress_every: cfg.progress_every,
    };
    let (progress_tx, mut progress_rx) = mpsc::channel::<ProbeProgress>(16);
    let progress_handle = tokio::spawn(async move {
        while let Some(p) = progress_rx.recv().await {
            tracing::info!("probed {}/{} url(s), {} live", p.checked, p.total, p.live);
        }
    });
    let set = probe::validate(set, opts, Some(progress_tx)).await;
    let _ = progress_handle.await;
    let live = set.len();
    let dead = unique - live;
    notifier.notify(&NotifyEvent::Validated { live, total: unique });

    // Diff against the previous run; only surviving, live URLs participate.
    let new_urls = history.new_urls(&set);
    notifier.notify(&NotifyEvent::NewUrls {
        count: new_urls.len(),
    });

    // Export phase: each artifact independently; a failed artifact never
    // stops the others.
    let mut artifacts_written = Vec::new();
    let mut artifact_errors = Vec::new();
    let renders: Vec<(PathBuf, Result<String>)> = vec![
        (cfg.output.playlist.clone(), Ok(export::render_playlist(&set))),
        (cfg.output.tsv.clone(), Ok(export::render_tsv(&set))),
        (cfg.output.json.clone(), export::render_json(&set)),
    ];
    for (path, rendered) in renders {
        let result = rendered.and_then(|contents| export::write_artifact(&path, &contents));
        match result {
            Ok(()) => {
                notifier.notify(&NotifyEvent::Artifact { path: path.clone() });
                artifacts_written.push(path);
            }
            Err(e) => {
                tracing::error!("artifact {} failed: {:#}", path.display(), e);
                artifact_errors.push((path, format!("{:#}", e)));
            }
        }
    }

    // Persist the new history, unconditionally overwriting the previous
    // file. Failure degrades the next run's diff, nothing else.
    let history_saved = match HistorySet::save(&history_path, &set) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("history not saved: {:#}", e);
            false
        }
    };

    tracing::info!(
        live,
        dead,
        new = new_urls.len(),
        artifacts = artifacts_written.len(),
        "run complete"
    );

    Ok(RunReport {
        fetch: fetch_stats,
        unique,
        live,
        dead,
        new_urls,
        artifacts_written,
        artifact_errors,
        history_saved,
        result: set,
    })
}
