#![allow(dead_code)]

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use tempfile::TempDir;
use usermine::{Annotation, AnnotateError, Annotator, CommentStore, FetchError, JsonTransport, Source};

pub const REDDIT_BASE: &str = "http://reddit.test";
pub const TWITTER_BASE: &str = "http://search.twitter.test";

/// Serves canned JSON pages keyed by exact URL and records every request.
/// Unknown URLs answer 404; URLs in `failing` answer a network error.
#[derive(Default)]
pub struct CannedTransport {
    pages: HashMap<String, Value>,
    failing: HashSet<String>,
    pub requested: RefCell<Vec<String>>,
}

impl CannedTransport {
    pub fn new() -> Self { Self::default() }

    pub fn page(mut self, url: impl Into<String>, body: Value) -> Self {
        self.pages.insert(url.into(), body);
        self
    }

    pub fn fail(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    pub fn request_count(&self) -> usize { self.requested.borrow().len() }
}

impl JsonTransport for CannedTransport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        if self.failing.contains(url) {
            return Err(FetchError::Network("connection reset by peer".to_string()));
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status { status: 404, url: url.to_string() })
    }
}

/// Annotator answering from a text → annotation table. Texts in `failing` error out;
/// unknown texts get an empty annotation.
#[derive(Default)]
pub struct ScriptedAnnotator {
    answers: HashMap<String, Annotation>,
    failing: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedAnnotator {
    pub fn new() -> Self { Self::default() }

    pub fn answer(mut self, text: &str, entities: &[&str], topics: &[&str]) -> Self {
        self.answers.insert(
            text.to_string(),
            Annotation {
                entities: entities.iter().map(|s| s.to_string()).collect(),
                topics: topics.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn call_count(&self) -> usize { self.calls.borrow().len() }
}

impl Annotator for ScriptedAnnotator {
    fn analyze(&self, text: &str) -> Result<Annotation, AnnotateError> {
        self.calls.borrow_mut().push(text.to_string());
        if self.failing.contains(text) {
            return Err(AnnotateError::Api { status: 500, message: "internal error".to_string() });
        }
        Ok(self.answers.get(text).cloned().unwrap_or_default())
    }
}

pub fn reddit_url(user: &str, after: Option<&str>) -> String {
    match after {
        Some(a) => format!("{}/user/{}/comments.json?limit=100&after={}", REDDIT_BASE, user, a),
        None => format!("{}/user/{}/comments.json?limit=100", REDDIT_BASE, user),
    }
}

pub fn twitter_url(query: &str) -> String {
    format!("{}/search.json{}", TWITTER_BASE, query)
}

/// A Reddit listing page with `(id, body)` children and the given `after` cursor.
pub fn reddit_page(items: &[(&str, &str)], after: Option<&str>) -> Value {
    let children: Vec<Value> = items
        .iter()
        .map(|(id, body)| json!({"kind": "t1", "data": {"id": id, "body": body, "author": "alice"}}))
        .collect();
    json!({"kind": "Listing", "data": {"children": children, "after": after, "before": null}})
}

/// A fresh store path in its own temp directory. Keep the `TempDir` alive for the
/// length of the test; dropping it removes the directory.
pub fn temp_store() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usermine-test.db");
    (dir, path)
}

/// Single-request HTTP server on a loopback port. Answers with a fixed status and
/// JSON body, then hands back the raw request it received.
pub struct OneShotServer {
    pub url: String,
    handle: thread::JoinHandle<String>,
}

impl OneShotServer {
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let resp = format!(
                "HTTP/1.1 {} Fixture\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(resp.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        Self { url: format!("http://{}", addr), handle }
    }

    /// Wait for the request to be served and return it verbatim.
    pub fn request(self) -> String {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let body_len = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Insert a comment and record its annotation right away.
pub fn seed_annotated(store: &CommentStore, id: &str, entities: &[&str], topics: &[&str]) {
    store.insert_comment(Source::Reddit, id, &format!("comment {}", id)).unwrap();
    let pending = store.pending_comments().unwrap();
    let row = pending.iter().find(|c| c.external_id == id).unwrap();
    let ann = Annotation {
        entities: entities.iter().map(|s| s.to_string()).collect(),
        topics: topics.iter().map(|s| s.to_string()).collect(),
    };
    store.record_annotation(row.id, &ann).unwrap();
}
