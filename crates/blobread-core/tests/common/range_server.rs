//! Minimal HTTP/1.1 blob server that supports HEAD and Range GET for integration tests.
//!
//! Serves static bodies keyed by request path. Unknown paths get 404. Chosen
//! GET responses can be cut short after half their body to simulate a
//! connection dropping mid-transfer, or answered the way a misbehaving server
//! or proxy would.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct RangeServerOptions {
    /// Zero-based indices of GET requests whose body is truncated.
    pub cut_gets: HashSet<usize>,
    /// Truncate every GET.
    pub cut_all_gets: bool,
    /// GETs answered with the right length but a window starting at byte 0.
    pub shifted_gets: HashSet<usize>,
    /// GETs answered 206 without a Content-Range header.
    pub bare_gets: HashSet<usize>,
    /// GETs answered 404 even though HEAD found the blob.
    pub missing_gets: HashSet<usize>,
    /// Ignore Range and answer every GET 200 with the whole body.
    pub ignore_range: bool,
}

/// One request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    /// (start, end inclusive) from `Range: bytes=X-Y`; `u64::MAX` for an open end.
    pub range: Option<(u64, u64)>,
}

pub struct RangeServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl RangeServer {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<SeenRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }
}

struct Shared {
    blobs: HashMap<String, Vec<u8>>,
    opts: RangeServerOptions,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
    gets_seen: Mutex<usize>,
}

/// Starts a server in a background thread serving `blobs` (path such as
/// "/bucket/name" to body). The server runs until the process exits.
pub fn start(blobs: HashMap<String, Vec<u8>>) -> RangeServer {
    start_with_options(blobs, RangeServerOptions::default())
}

pub fn start_with_options(blobs: HashMap<String, Vec<u8>>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::new(Shared {
        blobs,
        opts,
        requests: Arc::clone(&requests),
        gets_seen: Mutex::new(0),
    });
    thread::spawn(move || {
        // One connection at a time keeps GET numbering deterministic.
        for stream in listener.incoming().flatten() {
            handle(stream, &shared);
        }
    });
    RangeServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, shared: &Shared) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let seen = parse_request(request);
    shared.requests.lock().unwrap().push(seen.clone());

    let body = match shared.blobs.get(&seen.path) {
        Some(body) => body,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };
    let total = body.len() as u64;

    if seen.method.eq_ignore_ascii_case("HEAD") {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if !seen.method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
        return;
    }

    let index = {
        let mut seen_count = shared.gets_seen.lock().unwrap();
        let index = *seen_count;
        *seen_count += 1;
        index
    };
    let opts = &shared.opts;
    let cut = opts.cut_all_gets || opts.cut_gets.contains(&index);

    if opts.missing_gets.contains(&index) {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    if opts.ignore_range {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(body);
        return;
    }

    let (start, end_incl) = seen.range.unwrap_or((0, u64::MAX));
    let end_incl = end_incl.min(total.saturating_sub(1));
    if total == 0 || start > end_incl {
        let response = format!(
            "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    let (start, end_incl) = if opts.shifted_gets.contains(&index) {
        (0, end_incl - start)
    } else {
        (start, end_incl)
    };
    let slice = &body[start as usize..=end_incl as usize];
    let content_range = if opts.bare_gets.contains(&index) {
        String::new()
    } else {
        format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total)
    };
    let response = format!(
        "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        slice.len(),
        content_range
    );
    let _ = stream.write_all(response.as_bytes());
    if cut {
        let _ = stream.write_all(&slice[..slice.len() / 2]);
        let _ = stream.flush();
        let _ = stream.shutdown(Shutdown::Both);
        return;
    }
    let _ = stream.write_all(slice);
}

fn parse_request(request: &str) -> SeenRequest {
    let mut method = String::new();
    let mut path = String::new();
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            let mut parts = line.split_whitespace();
            method = parts.next().unwrap_or("").to_string();
            path = parts.next().unwrap_or("").to_string();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if let Some(part) = value.strip_prefix("bytes=") {
                    if let Some((a, b)) = part.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    SeenRequest {
        method,
        path,
        range,
    }
}
