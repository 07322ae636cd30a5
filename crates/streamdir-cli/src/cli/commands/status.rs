//! `streamdir status` – show history location and known-URL count.

use anyhow::Result;
use streamdir_core::config::StreamdirConfig;
use streamdir_core::history::HistorySet;

pub fn run_status(cfg: &StreamdirConfig) -> Result<()> {
    let path = cfg.history_path()?;
    let history = HistorySet::load(&path);
    println!("history: {}", path.display());
    println!("known urls: {}", history.len());
    println!("playlist:  {}", cfg.output.playlist.display());
    println!("tsv:       {}", cfg.output.tsv.display());
    println!("json:      {}", cfg.output.json.display());
    Ok(())
}
