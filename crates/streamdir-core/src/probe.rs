//! Liveness validation: one HEAD probe per URL under a bounded worker pool.
//!
//! Uses the curl crate (libcurl) for the probe itself. Probes are blocking
//! and run under `spawn_blocking`; a hung endpoint is cut off by its own
//! timeout and classified dead without stalling the pool. Dead is a normal
//! outcome, never a run failure.

use std::collections::HashSet;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::resultset::ResultSet;

/// Why a probe did not come back live. Only used for logging; every variant
/// classifies the URL as dead.
#[derive(Debug)]
pub enum ProbeError {
    /// Curl reported an error (timeout, connection, resolution, ...).
    Curl(curl::Error),
    /// The endpoint answered with a status outside the live set.
    Http(u32),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Curl(e) => write!(f, "{}", e),
            ProbeError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Curl(e) => Some(e),
            ProbeError::Http(_) => None,
        }
    }
}

/// Pool width, timeouts, and progress cadence for one validation pass.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub workers: usize,
    /// Emit a progress event every N completed probes.
    pub progress_every: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            total_timeout: Duration::from_secs(4),
            workers: 10,
            progress_every: 20,
        }
    }
}

/// Snapshot of validation progress, sent at fixed completion intervals.
#[derive(Debug, Clone, Copy)]
pub struct ProbeProgress {
    pub checked: usize,
    pub live: usize,
    pub total: usize,
}

/// Statuses that classify an endpoint as live after redirects.
pub fn is_live_status(code: u32) -> bool {
    matches!(code, 200 | 301 | 302)
}

/// Single HEAD-style probe: no body, follow redirects, per-probe timeouts.
/// Runs in the current thread; call from `spawn_blocking` in async code.
pub fn probe_status(
    url: &str,
    connect_timeout: Duration,
    total_timeout: Duration,
) -> Result<u32, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(total_timeout)?;
    easy.perform()?;
    easy.response_code()
}

fn probe_once(url: &str, opts: &ProbeOptions) -> Result<u32, ProbeError> {
    let code = probe_status(url, opts.connect_timeout, opts.total_timeout)
        .map_err(ProbeError::Curl)?;
    if is_live_status(code) {
        Ok(code)
    } else {
        Err(ProbeError::Http(code))
    }
}

/// Probe every URL in `set` and return the sub-mapping of live entries.
///
/// Consumes the input so no caller can observe a partially-filtered map;
/// downstream stages see either the original set or the fully validated one.
/// If `progress` is given, a snapshot is sent (best-effort, non-blocking)
/// every `opts.progress_every` completions and once at the end.
pub async fn validate(
    mut set: ResultSet,
    opts: ProbeOptions,
    progress: Option<mpsc::Sender<ProbeProgress>>,
) -> ResultSet {
    let total = set.len();
    if total == 0 {
        return set;
    }

    let workers = opts.workers.max(1);
    let mut queue: VecDeque<String> = set.sorted_urls().into_iter().collect();
    let mut join_set = JoinSet::new();
    let mut live: HashSet<String> = HashSet::with_capacity(total);
    let mut checked = 0usize;

    loop {
        while join_set.len() < workers {
            let Some(url) = queue.pop_front() else {
                break;
            };
            join_set.spawn(async move {
                let result = {
                    let url = url.clone();
                    tokio::task::spawn_blocking(move || probe_once(&url, &opts)).await
                };
                (url, result)
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let Ok((url, result)) = res else {
            // Join failure counts as one dead probe.
            checked += 1;
            continue;
        };
        checked += 1;
        match result {
            Ok(Ok(code)) => {
                tracing::debug!(url = %url, code, "probe live");
                live.insert(url);
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %url, "probe dead: {}", e);
            }
            Err(e) => {
                tracing::debug!(url = %url, "probe task failed: {}", e);
            }
        }

        if let Some(tx) = &progress {
            if checked % opts.progress_every.max(1) == 0 || checked == total {
                let _ = tx.try_send(ProbeProgress {
                    checked,
                    live: live.len(),
                    total,
                });
            }
        }
    }

    set.retain(|url| live.contains(url));
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_statuses() {
        assert!(is_live_status(200));
        assert!(is_live_status(301));
        assert!(is_live_status(302));
        assert!(!is_live_status(204));
        assert!(!is_live_status(404));
        assert!(!is_live_status(500));
    }

    #[test]
    fn probe_error_display() {
        let e = ProbeError::Http(403);
        assert_eq!(e.to_string(), "HTTP 403");
    }
}
