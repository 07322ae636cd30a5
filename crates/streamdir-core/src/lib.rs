pub mod config;
pub mod logging;

pub mod blocklist;
pub mod export;
pub mod fetch;
pub mod history;
pub mod notify;
pub mod pipeline;
pub mod probe;
pub mod record;
pub mod resultset;
