//! Minimal HTTP/1.1 server answering HEAD probes for integration tests.
//!
//! Responds to every request with a fixed status (optionally a redirect to
//! another URL). Runs until the process exits.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

/// Starts a server answering every request with `status`. Returns the base
/// URL (e.g. "http://127.0.0.1:12345/").
pub fn start(status: u32) -> String {
    start_inner(status, None)
}

/// Starts a server answering 302 with a `Location` header pointing at
/// `target`.
pub fn start_redirect_to(target: &str) -> String {
    start_inner(302, Some(target.to_string()))
}

/// Binds a port, then closes it, so connections are refused immediately.
/// Used as a fast "dead endpoint" stand-in.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn start_inner(status: u32, redirect_to: Option<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let redirect_to = redirect_to.clone();
            thread::spawn(move || handle(stream, status, redirect_to));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, status: u32, redirect_to: Option<String>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 4096];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let reason = match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        404 => "Not Found",
        _ => "Status",
    };
    let location = redirect_to
        .map(|t| format!("Location: {}\r\n", t))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\n{}\r\n",
        status, reason, location
    );
    let _ = stream.write_all(response.as_bytes());
}
