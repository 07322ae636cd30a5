//! Persisted URL history: the newline-delimited set of URLs known from the
//! previous run, used to compute newly-discovered entries.
//!
//! Load failures degrade to an empty set (treated as a first run); save
//! replaces the file atomically via write-to-temp-then-rename so a crash
//! never leaves a partial file for the next run to read as valid.

use std::collections::{BTreeSet, HashSet};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::resultset::ResultSet;

/// URLs persisted from the previous run.
#[derive(Debug, Clone, Default)]
pub struct HistorySet {
    urls: HashSet<String>,
}

impl HistorySet {
    /// Load history from `path`. A missing file is a first run (empty set);
    /// an unreadable file is logged and also degrades to empty.
    pub fn load(path: &Path) -> HistorySet {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no history at {}, treating as first run", path.display());
                return HistorySet::default();
            }
            Err(e) => {
                tracing::warn!("history unreadable at {}: {}", path.display(), e);
                return HistorySet::default();
            }
        };
        let urls: HashSet<String> = data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        tracing::debug!("loaded {} known url(s) from history", urls.len());
        HistorySet { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// URLs present in `set` but not in history, i.e. newly discovered this
    /// run. Sorted so reports and notifications are stable.
    pub fn new_urls(&self, set: &ResultSet) -> BTreeSet<String> {
        set.sorted_urls()
            .into_iter()
            .filter(|url| !self.urls.contains(url))
            .collect()
    }

    /// Overwrite the history file with the URLs of `set`, unconditionally.
    /// URLs that disappeared this run are dropped, not retained.
    pub fn save(path: &Path, set: &ResultSet) -> Result<()> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let dir = parent.unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp history in {}", dir.display()))?;
        for url in set.sorted_urls() {
            writeln!(tmp, "{}", url).context("write history line")?;
        }
        tmp.persist(path)
            .with_context(|| format!("replace history: {}", path.display()))?;
        Ok(())
    }
}
