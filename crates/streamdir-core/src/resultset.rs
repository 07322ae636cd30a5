//! The deduplicated URL -> entry mapping and its single-writer collector.
//!
//! Fetch workers never touch the map directly; they send candidates down an
//! mpsc channel and `collect` drains it from one task. Dedup is therefore
//! defined by channel arrival order: last write wins. When sources are
//! fetched concurrently the winner for a URL seen from two groups is
//! completion-order dependent; that is an accepted characteristic, not a
//! race.

use std::collections::{BTreeSet, HashMap};

use tokio::sync::mpsc;

use crate::record::Candidate;

/// Display name and group label kept for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub group: String,
}

/// Mapping from URL to its entry. Exactly one entry per URL at any time.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: HashMap<String, Entry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for the candidate's URL.
    /// Returns true if an existing entry was replaced.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        self.entries
            .insert(
                candidate.url,
                Entry {
                    name: candidate.name,
                    group: candidate.group,
                },
            )
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&Entry> {
        self.entries.get(url)
    }

    /// URLs in sorted order (stable history files and probe queues).
    pub fn sorted_urls(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Entries sorted by display name then URL, for deterministic exports.
    pub fn sorted_entries(&self) -> Vec<(&String, &Entry)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|(au, ae), (bu, be)| ae.name.cmp(&be.name).then_with(|| au.cmp(bu)));
        entries
    }

    /// Keep only URLs for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|url, _| keep(url));
    }
}

/// Drain candidates from `rx` into a fresh result set. This is the only
/// writer; run it as its own task while fetch workers hold senders.
pub async fn collect(mut rx: mpsc::Receiver<Candidate>) -> ResultSet {
    let mut set = ResultSet::new();
    while let Some(candidate) = rx.recv().await {
        set.insert(candidate);
    }
    set
}
