//! `streamdir sources` – list configured sources.

use anyhow::Result;
use streamdir_core::config::StreamdirConfig;

pub fn run_sources(cfg: &StreamdirConfig) -> Result<()> {
    if cfg.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }
    println!("{:<16} {:<12} {}", "NAME", "GROUP", "URL");
    for source in &cfg.sources {
        let group = if source.group.is_empty() {
            "-"
        } else {
            source.group.as_str()
        };
        println!("{:<16} {:<12} {}", source.name, group, source.url);
    }
    Ok(())
}
