//! Minimal HTTP/1.1 server standing in for the GitHub release host.
//!
//! Serves canned responses by path and counts every request it receives, so
//! tests can assert how many network calls an operation made.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
    /// Overrides the Content-Length header value.
    declared_length: Option<u64>,
    /// Omit Content-Length and close the connection after the body.
    omit_length: bool,
    /// Extra response headers.
    headers: Vec<(String, String)>,
}

/// A running server. It lives until the test process exits.
#[derive(Clone)]
pub struct ReleaseServer {
    base_url: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    hits: Arc<AtomicUsize>,
}

impl ReleaseServer {
    /// Starts a server on an ephemeral loopback port.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let server_routes = Arc::clone(&routes);
        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&server_routes);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            routes,
            hits,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Serves `body` with `status` at `path`.
    pub fn route(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.insert(
            path,
            Route {
                status,
                body: body.into(),
                declared_length: None,
                omit_length: false,
                headers: Vec::new(),
            },
        );
    }

    /// Serves `body` with `status` and the extra `headers` at `path`.
    pub fn route_with_headers(
        &self,
        path: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<Vec<u8>>,
    ) {
        self.insert(
            path,
            Route {
                status,
                body: body.into(),
                declared_length: None,
                omit_length: false,
                headers: headers
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                    .collect(),
            },
        );
    }

    /// Serves `body` at `path` but announces `declared` as Content-Length.
    pub fn route_with_declared_length(&self, path: &str, declared: u64, body: impl Into<Vec<u8>>) {
        self.insert(
            path,
            Route {
                status: 200,
                body: body.into(),
                declared_length: Some(declared),
                omit_length: false,
                headers: Vec::new(),
            },
        );
    }

    /// Serves `body` at `path` without a Content-Length header.
    pub fn route_without_length(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.insert(
            path,
            Route {
                status: 200,
                body: body.into(),
                declared_length: None,
                omit_length: true,
                headers: Vec::new(),
            },
        );
    }

    /// Publishes release `v{version}` for `owner/repo` listing one asset per
    /// `(name, path)` pair, served from this server.
    pub fn publish_release(&self, owner: &str, repo: &str, version: &str, assets: &[(&str, &str)]) {
        let assets: Vec<String> = assets
            .iter()
            .map(|(name, path)| {
                format!(
                    r#"{{"name": "{name}", "browser_download_url": "{}{path}", "state": "uploaded"}}"#,
                    self.base_url
                )
            })
            .collect();
        let json = format!(
            r#"{{"tag_name": "v{version}", "draft": false, "prerelease": false, "assets": [{}]}}"#,
            assets.join(",")
        );
        self.route(
            &format!("/repos/{owner}/{repo}/releases/tags/v{version}"),
            200,
            json,
        );
    }

    fn insert(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }
}

fn handle(mut stream: TcpStream, routes: &Mutex<HashMap<String, Route>>, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let route = routes.lock().unwrap().get(&path).cloned();
    let route = route.unwrap_or(Route {
        status: 404,
        body: br#"{"message": "Not Found"}"#.to_vec(),
        declared_length: None,
        omit_length: false,
        headers: Vec::new(),
    });

    let length_header = if route.omit_length {
        String::new()
    } else {
        format!(
            "Content-Length: {}\r\n",
            route.declared_length.unwrap_or(route.body.len() as u64)
        )
    };
    let extra_headers: String = route
        .headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}\r\n"))
        .collect();
    let head = format!(
        "HTTP/1.1 {} {}\r\n{}{}Connection: close\r\n\r\n",
        route.status,
        reason(route.status),
        length_header,
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}
