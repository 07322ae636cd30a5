use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// One configured upstream listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Human-readable source name (used in logs).
    pub name: String,
    /// URL of the listing endpoint (JSON array of records).
    pub url: String,
    /// Group label attached to every candidate from this source.
    #[serde(default)]
    pub group: String,
}

/// Paths of the three export artifacts, relative to the working directory
/// unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub playlist: PathBuf,
    pub tsv: PathBuf,
    pub json: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            playlist: PathBuf::from("streams.m3u"),
            tsv: PathBuf::from("streams.tsv"),
            json: PathBuf::from("streams.json"),
        }
    }
}

fn default_fetch_workers() -> usize {
    6
}
fn default_probe_workers() -> usize {
    10
}
fn default_connect_timeout_secs() -> u64 {
    2
}
fn default_total_timeout_secs() -> u64 {
    4
}
fn default_progress_every() -> usize {
    20
}

/// Global configuration loaded from `~/.config/streamdir/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamdirConfig {
    /// Upstream listings to aggregate.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    /// Display-name substrings that disqualify a candidate (case-sensitive).
    #[serde(default)]
    pub blocklist: Vec<String>,
    /// Concurrent source fetches.
    #[serde(default = "default_fetch_workers")]
    pub fetch_workers: usize,
    /// Concurrent liveness probes.
    #[serde(default = "default_probe_workers")]
    pub probe_workers: usize,
    /// Per-probe connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-probe total request timeout in seconds.
    #[serde(default = "default_total_timeout_secs")]
    pub total_timeout_secs: u64,
    /// Emit a probe progress event every N completions.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    /// Export artifact paths.
    #[serde(default)]
    pub output: OutputConfig,
    /// Override for the history file; defaults to the XDG state dir.
    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

impl Default for StreamdirConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            blocklist: Vec::new(),
            fetch_workers: default_fetch_workers(),
            probe_workers: default_probe_workers(),
            connect_timeout_secs: default_connect_timeout_secs(),
            total_timeout_secs: default_total_timeout_secs(),
            progress_every: default_progress_every(),
            output: OutputConfig::default(),
            history_path: None,
        }
    }
}

/// Validation failures that abort a run before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no sources configured")]
    NoSources,
    #[error("source {0:?} has an empty url")]
    EmptySourceUrl(String),
    #[error("fetch_workers and probe_workers must be at least 1")]
    ZeroWorkers,
    #[error("timeouts must be non-zero and connect_timeout_secs <= total_timeout_secs")]
    BadTimeouts,
    #[error("blocklist entries must be non-empty")]
    EmptyBlockTerm,
}

impl StreamdirConfig {
    /// Check the config for a pipeline run. An empty blocklist term would
    /// match every display name, so it is rejected here rather than silently
    /// emptying the directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        for source in &self.sources {
            if source.url.trim().is_empty() {
                return Err(ConfigError::EmptySourceUrl(source.name.clone()));
            }
        }
        if self.fetch_workers == 0 || self.probe_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.connect_timeout_secs == 0
            || self.total_timeout_secs == 0
            || self.connect_timeout_secs > self.total_timeout_secs
        {
            return Err(ConfigError::BadTimeouts);
        }
        if self.blocklist.iter().any(|term| term.is_empty()) {
            return Err(ConfigError::EmptyBlockTerm);
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }

    /// History file location: the configured override, or
    /// `~/.local/state/streamdir/known_urls.txt`.
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_path {
            return Ok(path.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("streamdir")?;
        Ok(xdg_dirs
            .get_state_home()
            .join("streamdir")
            .join("known_urls.txt"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("streamdir")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StreamdirConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = StreamdirConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: StreamdirConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_source() -> Vec<SourceSpec> {
        vec![SourceSpec {
            name: "main".into(),
            url: "http://lists.example/channels.json".into(),
            group: "tv".into(),
        }]
    }

    #[test]
    fn default_config_values() {
        let cfg = StreamdirConfig::default();
        assert_eq!(cfg.fetch_workers, 6);
        assert_eq!(cfg.probe_workers, 10);
        assert_eq!(cfg.connect_timeout_secs, 2);
        assert_eq!(cfg.total_timeout_secs, 4);
        assert_eq!(cfg.progress_every, 20);
        assert!(cfg.sources.is_empty());
        assert!(cfg.blocklist.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = StreamdirConfig::default();
        cfg.sources = one_source();
        cfg.blocklist = vec!["shopping".into()];
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: StreamdirConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.sources, cfg.sources);
        assert_eq!(parsed.blocklist, cfg.blocklist);
        assert_eq!(parsed.probe_workers, cfg.probe_workers);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            blocklist = ["ads"]

            [[sources]]
            name = "main"
            url = "http://lists.example/channels.json"
        "#;
        let cfg: StreamdirConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.fetch_workers, 6);
        assert_eq!(cfg.probe_workers, 10);
        assert_eq!(cfg.sources[0].group, "");
        assert_eq!(cfg.output.playlist, PathBuf::from("streams.m3u"));
        assert!(cfg.history_path.is_none());
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let cfg = StreamdirConfig::default();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoSources)));
    }

    #[test]
    fn validate_rejects_empty_block_term() {
        let mut cfg = StreamdirConfig::default();
        cfg.sources = one_source();
        cfg.blocklist = vec!["ok".into(), String::new()];
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyBlockTerm)));
    }

    #[test]
    fn validate_rejects_connect_longer_than_total() {
        let mut cfg = StreamdirConfig::default();
        cfg.sources = one_source();
        cfg.connect_timeout_secs = 10;
        cfg.total_timeout_secs = 4;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadTimeouts)));
    }

    #[test]
    fn validate_accepts_default_timeouts() {
        let mut cfg = StreamdirConfig::default();
        cfg.sources = one_source();
        cfg.blocklist = vec!["shopping".into()];
        assert!(cfg.validate().is_ok());
    }
}
