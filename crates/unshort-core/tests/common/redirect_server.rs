//! Minimal HTTP/1.1 server for integration tests.
//!
//! Each request path is passed to a route function that picks the reply:
//! a canned raw response or a connection that never answers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub enum Reply {
    /// Raw response bytes (status line, headers, blank line, body).
    Raw(String),
    /// Accept the request, then keep the socket open without answering.
    Hang(Duration),
}

impl Reply {
    pub fn redirect(locations: &[&str]) -> Self {
        let mut resp = String::from("HTTP/1.1 301 Moved Permanently\r\n");
        for loc in locations {
            resp.push_str(&format!("Location: {}\r\n", loc));
        }
        resp.push_str("Content-Length: 0\r\nConnection: close\r\n\r\n");
        Reply::Raw(resp)
    }

    pub fn ok(body: &str) -> Self {
        Reply::Raw(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ))
    }
}

pub struct TestServer {
    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub base: String,
    /// Number of requests received so far.
    pub hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start<F>(route: F) -> TestServer
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let route = Arc::new(route);
    let hits = Arc::new(AtomicUsize::new(0));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let route = Arc::clone(&route);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, route.as_ref(), &hits));
        }
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

/// A URL on a port with nothing listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/nobody-home", port)
}

fn handle<F>(mut stream: TcpStream, route: &F, hits: &AtomicUsize)
where
    F: Fn(&str) -> Reply,
{
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    hits.fetch_add(1, Ordering::SeqCst);
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    match route(&path) {
        Reply::Raw(resp) => {
            let _ = stream.write_all(resp.as_bytes());
        }
        Reply::Hang(d) => thread::sleep(d),
    }
}
