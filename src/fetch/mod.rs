//! Paginated comment feeds and the ingest loop that writes them into the store.
//!
//! A feed only knows its first URL and how to read one page. `FeedStream` drives the
//! pagination over a `JsonTransport`, yielding records lazily and ending the stream
//! on a missing cursor, a cursor pointing back at any page already read, the page cap,
//! or the first fetch error.

pub mod http;
pub mod reddit;
pub mod twitter;

use crate::error::{FetchError, StoreResult};
use crate::store::CommentStore;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::fmt;

pub use self::http::HttpTransport;
pub use self::reddit::RedditFeed;
pub use self::twitter::TwitterFeed;

/// The service a comment came from. External ids are unique per source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Reddit,
    Twitter,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Reddit => "reddit",
            Source::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encode a value for use as a URL path segment or query value.
pub fn encode_component(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// One comment as read from a feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentRecord {
    pub external_id: String,
    pub text: String,
}

/// Blocking GET returning a decoded JSON body.
pub trait JsonTransport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// What one page of a feed contributed.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<CommentRecord>,
    pub next_url: Option<String>,
}

pub trait Feed {
    fn source(&self) -> Source;
    fn first_url(&self) -> String;
    /// Read one decoded page. Shapes the feed does not recognize yield an empty,
    /// final page rather than an error.
    fn parse_page(&self, page: &Value) -> Page;
}

/// Lazy record iterator over a paginated feed.
pub struct FeedStream<'t, F: Feed> {
    feed: F,
    transport: &'t dyn JsonTransport,
    next_url: Option<String>,
    visited: HashSet<String>,
    buffered: VecDeque<CommentRecord>,
    pages: usize,
    max_pages: Option<usize>,
}

impl<'t, F: Feed> FeedStream<'t, F> {
    pub fn new(feed: F, transport: &'t dyn JsonTransport) -> Self {
        let first = feed.first_url();
        Self {
            feed,
            transport,
            next_url: Some(first),
            visited: HashSet::new(),
            buffered: VecDeque::new(),
            pages: 0,
            max_pages: None,
        }
    }

    pub fn max_pages(mut self, pages: Option<usize>) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }
}

impl<F: Feed> Iterator for FeedStream<'_, F> {
    type Item = Result<CommentRecord, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(rec) = self.buffered.pop_front() {
                return Some(Ok(rec));
            }
            let url = self.next_url.take()?;
            if let Some(cap) = self.max_pages {
                if self.pages >= cap {
                    tracing::debug!("{}: page cap {} reached", self.feed.source(), cap);
                    return None;
                }
            }

            tracing::debug!("{}: GET {}", self.feed.source(), url);
            let body = match self.transport.get_json(&url) {
                Ok(v) => v,
                Err(e) => return Some(Err(e)),
            };
            self.pages += 1;
            self.visited.insert(url);

            let page = self.feed.parse_page(&body);
            match page.next_url {
                Some(next) if self.visited.contains(&next) => {
                    tracing::warn!("{}: feed cursor points back at {}, stopping", self.feed.source(), next);
                }
                next => self.next_url = next,
            }
            self.buffered.extend(page.items);
        }
    }
}

/// Outcome of ingesting one source.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub seen: u64,
    pub inserted: u64,
    /// The fetch error that ended the stream early, if any. Rows inserted before it stay.
    pub error: Option<FetchError>,
}

/// Drain `records` into the store, skipping comments already present.
/// Fetch errors end the loop and are reported; store errors are returned.
pub fn ingest<I>(store: &CommentStore, source: Source, records: I) -> StoreResult<IngestReport>
where
    I: IntoIterator<Item = Result<CommentRecord, FetchError>>,
{
    let mut report = IngestReport::default();
    for rec in records {
        match rec {
            Ok(rec) => {
                report.seen += 1;
                if store.insert_comment(source, &rec.external_id, &rec.text)? {
                    report.inserted += 1;
                }
            }
            Err(e) => {
                report.error = Some(e);
                break;
            }
        }
    }
    Ok(report)
}
