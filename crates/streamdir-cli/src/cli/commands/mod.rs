//! CLI command handlers. Each command is in its own file.

mod probe;
mod run;
mod sources;
mod status;

pub use probe::run_probe;
pub use run::run_pipeline;
pub use sources::run_sources;
pub use status::run_status;
