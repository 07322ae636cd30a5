//! `streamdir probe` – one-off liveness check for a URL.

use anyhow::Result;
use streamdir_core::config::StreamdirConfig;
use streamdir_core::probe;

pub async fn run_probe(cfg: &StreamdirConfig, url: &str) -> Result<()> {
    let connect = cfg.connect_timeout();
    let total = cfg.total_timeout();
    let url_owned = url.to_string();
    let result =
        tokio::task::spawn_blocking(move || probe::probe_status(&url_owned, connect, total))
            .await?;

    match result {
        Ok(code) if probe::is_live_status(code) => {
            println!("live (HTTP {})", code);
        }
        Ok(code) => {
            println!("dead (HTTP {})", code);
        }
        Err(e) => {
            println!("dead ({})", e);
        }
    }
    Ok(())
}
