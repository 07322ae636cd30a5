//! Upstream listing fetch: the source fetcher seam and the bounded pool
//! that feeds normalized, blocklist-filtered candidates into the collector
//! channel.
//!
//! A failed source contributes zero candidates; the error is logged and the
//! run continues. Keeps up to `width` fetches in flight at once; when one
//! finishes, the next queued source is started until the queue is empty.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::blocklist::Blocklist;
use crate::config::SourceSpec;
use crate::record::{self, Candidate, RawRecord};

/// Supplies raw records for one configured source. Implementations are
/// blocking; the pool runs them under `spawn_blocking`.
pub trait SourceFetcher: Send + Sync + 'static {
    fn fetch(&self, source: &SourceSpec) -> Result<Vec<RawRecord>>;
}

/// Fetches a JSON array of records over HTTP. Listing downloads get more
/// generous timeouts than the liveness probes; a slow listing is still a
/// listing.
pub struct HttpFetcher {
    connect_timeout: Duration,
    total_timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            total_timeout: Duration::from_secs(30),
        }
    }
}

impl HttpFetcher {
    pub fn new(connect_timeout: Duration, total_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            total_timeout,
        }
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, source: &SourceSpec) -> Result<Vec<RawRecord>> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&source.url).context("invalid source URL")?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.total_timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().context("listing request failed")?;
        }

        let code = easy.response_code().context("no response code")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {}", source.url, code);
        }

        serde_json::from_slice(&body)
            .with_context(|| format!("source {} returned malformed listing", source.name))
    }
}

/// Per-run fetch counters, reported alongside the pipeline summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Sources that returned a listing.
    pub sources_ok: usize,
    /// Sources skipped after a fetch or parse failure.
    pub sources_failed: usize,
    /// Raw records seen across all listings.
    pub records: usize,
    /// Records the normalizer rejected.
    pub rejected: usize,
    /// Candidates dropped by the blocklist.
    pub blocked: usize,
}

struct SourceOutcome {
    ok: bool,
    records: usize,
    rejected: usize,
    blocked: usize,
}

/// Fetch all sources with up to `width` in flight, sending surviving
/// candidates down `tx`. Returns once every source has completed or failed;
/// the caller drops its sender clone to let the collector finish.
pub async fn run_fetch_pool(
    fetcher: Arc<dyn SourceFetcher>,
    sources: &[SourceSpec],
    blocklist: &Blocklist,
    width: usize,
    tx: mpsc::Sender<Candidate>,
) -> FetchStats {
    let width = width.max(1);
    let mut queue: VecDeque<SourceSpec> = sources.iter().cloned().collect();
    let mut join_set = JoinSet::new();
    let mut stats = FetchStats::default();

    loop {
        while join_set.len() < width {
            let Some(source) = queue.pop_front() else {
                break;
            };
            let fetcher = Arc::clone(&fetcher);
            let blocklist = blocklist.clone();
            let tx = tx.clone();
            join_set.spawn(async move {
                fetch_one(fetcher, source, blocklist, tx).await
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(outcome) => {
                if outcome.ok {
                    stats.sources_ok += 1;
                } else {
                    stats.sources_failed += 1;
                }
                stats.records += outcome.records;
                stats.rejected += outcome.rejected;
                stats.blocked += outcome.blocked;
            }
            Err(e) => {
                tracing::error!("fetch task join: {}", e);
                stats.sources_failed += 1;
            }
        }
    }

    stats
}

async fn fetch_one(
    fetcher: Arc<dyn SourceFetcher>,
    source: SourceSpec,
    blocklist: Blocklist,
    tx: mpsc::Sender<Candidate>,
) -> SourceOutcome {
    let label = source.name.clone();
    let fetched = tokio::task::spawn_blocking(move || {
        let records = fetcher.fetch(&source);
        (source, records)
    })
    .await;

    let (source, records) = match fetched {
        Ok((source, Ok(records))) => (source, records),
        Ok((source, Err(e))) => {
            tracing::warn!(source = %source.name, "source skipped: {:#}", e);
            return SourceOutcome {
                ok: false,
                records: 0,
                rejected: 0,
                blocked: 0,
            };
        }
        Err(e) => {
            tracing::error!(source = %label, "fetch task panicked: {}", e);
            return SourceOutcome {
                ok: false,
                records: 0,
                rejected: 0,
                blocked: 0,
            };
        }
    };

    let mut outcome = SourceOutcome {
        ok: true,
        records: records.len(),
        rejected: 0,
        blocked: 0,
    };
    for record in &records {
        let Some(candidate) = record::normalize(record, &source.group) else {
            outcome.rejected += 1;
            continue;
        };
        if blocklist.is_blocked(&candidate.name) {
            outcome.blocked += 1;
            continue;
        }
        if tx.send(candidate).await.is_err() {
            // Collector gone; nothing left to feed.
            break;
        }
    }
    tracing::debug!(
        source = %source.name,
        records = outcome.records,
        rejected = outcome.rejected,
        blocked = outcome.blocked,
        "source fetched"
    );
    outcome
}
