//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths. Each route has a body and a list of statuses
//! used for successive hits (the last one repeats), so a route can fail a few
//! times before succeeding. Every response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub body: Vec<u8>,
    /// Status per hit; the last entry is reused once exhausted.
    pub statuses: Vec<u16>,
    /// Sleep before answering.
    pub delay: Duration,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            statuses: vec![200],
            delay: Duration::ZERO,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            body: format!("status {}", code).into_bytes(),
            statuses: vec![code],
            delay: Duration::ZERO,
        }
    }

    /// Fails with `code` `times` times, then serves `body` with 200.
    pub fn flaky(code: u16, times: usize, body: impl Into<Vec<u8>>) -> Self {
        let mut statuses = vec![code; times];
        statuses.push(200);
        Self {
            body: body.into(),
            statuses,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct TestServer {
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    peak: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Highest number of requests that were being handled at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Starts the server on a random loopback port. Runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> TestServer {
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (format!("/{}", p.trim_start_matches('/')), r))
            .collect(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let server = TestServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits: Arc::clone(&hits),
        peak: Arc::clone(&peak),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            thread::spawn(move || handle(stream, &routes, &hits, &active, &peak));
        }
    });
    server
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
    active: &AtomicUsize,
    peak: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    // Counted until the response goes out; the client cannot start its next
    // request before reading it.
    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
    peak.fetch_max(now, Ordering::SeqCst);

    let hit = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count - 1
    };

    let (status, body, delay) = match routes.get(&path) {
        Some(route) => {
            let status = route
                .statuses
                .get(hit)
                .or(route.statuses.last())
                .copied()
                .unwrap_or(200);
            let body = if status == 200 {
                route.body.clone()
            } else {
                format!("status {}", status).into_bytes()
            };
            (status, body, route.delay)
        }
        None => (404, b"not found".to_vec(), Duration::ZERO),
    };
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nETag: \"{}-{}\"\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len(),
        path.trim_start_matches('/'),
        body.len()
    );
    active.fetch_sub(1, Ordering::SeqCst);
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
