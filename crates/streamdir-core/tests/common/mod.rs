pub mod probe_server;
