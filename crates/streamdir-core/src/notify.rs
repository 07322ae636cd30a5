//! Notification seam: the pipeline emits structured summary events; the
//! collaborator decides what to do with them. Delivery is best-effort and
//! never blocks the run.

use std::path::PathBuf;

/// Summary events emitted during a run.
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    /// URLs seen for the first time since the previous run.
    NewUrls { count: usize },
    /// Validation finished: `live` of `total` probed URLs responded.
    Validated { live: usize, total: usize },
    /// An export artifact was written.
    Artifact { path: PathBuf },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: &NotifyEvent);
}

/// Default notifier: forwards events to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotifyEvent) {
        match event {
            NotifyEvent::NewUrls { count } => {
                tracing::info!("{} new url(s) since previous run", count);
            }
            NotifyEvent::Validated { live, total } => {
                tracing::info!("{} of {} url(s) live", live, total);
            }
            NotifyEvent::Artifact { path } => {
                tracing::info!("wrote {}", path.display());
            }
        }
    }
}
